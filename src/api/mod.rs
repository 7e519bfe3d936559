//! HTTP API
//!
//! An axum router exposing the admin operations as JSON endpoints, plus the
//! static front-end and the locale script download.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `POST /api/validate-key` | Access-key check |
//! | `POST /api/test-connection` | Connection test |
//! | `POST /api/import-patients` | Patient batch import |
//! | `POST /api/create-employee` | New `tblNhanVien` row |
//! | `POST /api/create-account` | New `tblUser` login |
//! | `POST /api/execute-sql` | Ad-hoc SQL (when enabled) |
//! | `GET /api/health` | Liveness |
//! | `GET /api/downloads/SetVietnameseLocale.bat` | Locale script |

pub mod handlers;
pub mod response;
pub mod router;
pub mod state;

pub use response::{ApiError, ApiJson, Envelope};
pub use router::build_router;
pub use state::AppState;
