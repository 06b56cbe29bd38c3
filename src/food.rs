use crate::render::RenderHandle;
use crate::sampling::Position;

/// A static, single-use energy source.
///
/// Eating only sets `eaten`; the food stays in the list until the next scan
/// over the food collection removes it.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub position: Position,
    pub eaten: bool,
    pub handle: RenderHandle,
}

impl Food {
    pub fn new(position: Position, handle: RenderHandle) -> Self {
        Food {
            position,
            eaten: false,
            handle,
        }
    }
}
