use crate::eval::PieceSquareTables;

use log::debug;
use std::sync::OnceLock;

static TABLES: OnceLock<PieceSquareTables> = OnceLock::new();

/// Initialises global lookup tables used by the engine, currently the piece-square tables used by
/// the static evaluation.
///
/// Any subsequent calls to this function after the first have no effect and return instantly, so
/// every entry point into the engine calls it.
pub fn init_globals() {
    tables();
}

/// Returns true once `init_globals()` has run.
pub fn is_initialized() -> bool {
    TABLES.get().is_some()
}

pub(crate) fn tables() -> &'static PieceSquareTables {
    // The closure is only ever invoked on the first call.
    TABLES.get_or_init(|| {
        debug!("building piece-square tables");
        PieceSquareTables::build()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init_globals();
        let first = tables() as *const PieceSquareTables;
        init_globals();
        let second = tables() as *const PieceSquareTables;
        assert!(is_initialized());
        assert_eq!(first, second);
    }
}
