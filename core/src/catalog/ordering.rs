// core/src/catalog/ordering.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
  Up,
  Down,
}

/// Swaps `target` with its neighbour in `ordered` and renumbers everything `0..n`.
///
/// Returns `None` when `target` is absent or already at the edge it is moving towards.
pub fn reorder_positions(ordered: &[Uuid], target: Uuid, direction: MoveDirection) -> Option<Vec<(Uuid, i32)>> {
  let index = ordered.iter().position(|id| *id == target)?;
  let neighbour = match direction {
    MoveDirection::Up => index.checked_sub(1)?,
    MoveDirection::Down => {
      if index + 1 >= ordered.len() {
        return None;
      }
      index + 1
    }
  };

  let mut ids = ordered.to_vec();
  ids.swap(index, neighbour);
  Some(ids.into_iter().zip(0..).collect())
}
