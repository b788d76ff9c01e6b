//! Pure rendering of a transcript window into a model-ready context.

use chatrelay_common::Turn;

/// Trailing cue line inviting the next assistant turn.
const ASSISTANT_CUE: &str = "Assistant:";

/// Render an ordered window of turns into a single linear context.
///
/// Each turn becomes a `"<Role>: <content>"` line; the cue line follows.
/// Deterministic and total: identical input always yields identical output,
/// and an empty window yields just the cue.
pub fn assemble(turns: &[Turn]) -> String {
    let mut context = String::new();
    for turn in turns {
        context.push_str(turn.role.display_name());
        context.push_str(": ");
        context.push_str(&turn.content);
        context.push('\n');
    }
    context.push_str(ASSISTANT_CUE);
    context
}
