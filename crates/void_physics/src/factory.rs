//! Body factory - turns creation requests into registered bodies

use crate::body::BoxRequest;
use crate::context::PhysicsContext;
use crate::error::Result;
use crate::handle::StableBodyId;

impl PhysicsContext {
    /// Create a box body and return its stable id.
    ///
    /// The body is active from the next step on and resolvable until a
    /// matching [`destroy`](PhysicsContext::destroy). Nothing is registered
    /// when the engine refuses the body.
    pub fn create_box(&mut self, request: BoxRequest) -> Result<StableBodyId> {
        let layer = request.layer();
        let handle = self.world.create_box(&request, &self.config, &self.filter)?;

        let id = self.table.allocate();
        if let Err(e) = self.table.register(id, handle) {
            self.world.remove_body(handle);
            log::error!("Handle table corrupted while creating a body: {e}");
            return Err(e);
        }

        log::debug!(
            "Created {:?} box {} on layer {:?} (half extents {:?})",
            request.motion_type,
            id,
            layer,
            request.half_extents
        );
        Ok(id)
    }
}
