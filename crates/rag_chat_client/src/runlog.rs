//! Run-log accumulator for the streamed response. Each SSE payload is a
//! patch (`{"ops": [...]}`) applied against a JSON state; the user-facing
//! answer is the `/final_output` field of that state at any point in time.
//!
//! The op set mirrors what the backend's stream-log protocol emits
//! (JSON-patch `replace`/`add`/`remove`, with `/-` appending to arrays).
//! Unknown ops are ignored; the reducer belongs to the protocol, not us.

use serde::Deserialize;
use serde_json::Value;

/// One patch operation from a stream chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchOp {
    pub op: String,
    pub path: String,
    #[serde(default)]
    pub value: Value,
}

/// One streamed chunk: a batch of patch operations.
#[derive(Debug, Clone, Deserialize)]
pub struct RunLogPatch {
    #[serde(default)]
    pub ops: Vec<PatchOp>,
}

/// The running merged result of successive patches for one request.
#[derive(Debug, Default)]
pub struct RunLog {
    state: Value,
}

impl RunLog {
    /// Merge one patch into the accumulated state.
    pub fn apply(&mut self, patch: &RunLogPatch) {
        for op in &patch.ops {
            apply_op(&mut self.state, op);
        }
    }

    /// The answer text exposed so far, if the state carries one.
    pub fn final_output(&self) -> Option<&str> {
        self.state.pointer("/final_output")?.as_str()
    }

    pub fn state(&self) -> &Value {
        &self.state
    }
}

fn apply_op(state: &mut Value, op: &PatchOp) {
    if op.path.is_empty() {
        match op.op.as_str() {
            "replace" | "add" => *state = op.value.clone(),
            "remove" => *state = Value::Null,
            _ => {}
        }
        return;
    }

    let segments: Vec<String> = op
        .path
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut target = state;
    for segment in parents {
        target = match target {
            Value::Object(map) => map
                .entry(segment.clone())
                .or_insert(Value::Object(Default::default())),
            Value::Array(items) => match segment.parse::<usize>().ok() {
                Some(index) if index < items.len() => &mut items[index],
                _ => return,
            },
            _ => return,
        };
    }

    match (op.op.as_str(), target) {
        ("add", Value::Array(items)) if last.as_str() == "-" => items.push(op.value.clone()),
        ("add" | "replace", Value::Array(items)) => {
            if let Ok(index) = last.parse::<usize>() {
                if index < items.len() {
                    items[index] = op.value.clone();
                } else if index == items.len() {
                    items.push(op.value.clone());
                }
            }
        }
        ("add" | "replace", Value::Object(map)) => {
            map.insert(last.clone(), op.value.clone());
        }
        ("remove", Value::Array(items)) => {
            if let Ok(index) = last.parse::<usize>() {
                if index < items.len() {
                    items.remove(index);
                }
            }
        }
        ("remove", Value::Object(map)) => {
            map.remove(last);
        }
        _ => {}
    }
}
