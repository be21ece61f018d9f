//! HTTP API: handlers and request/response models.
//!
//! All routes live under `/api/admin/quality`:
//!
//! - **Sampling points** (`/sampling-points/*`): testing point CRUD and activation
//! - **Quality tests** (`/tests/*`): test CRUD, soft delete, restore and physical delete
//! - **Daily records** (`/daily-records/*`): record CRUD, soft delete, restore and physical delete
//!
//! Every response is wrapped in the `{ success, data, error }` envelope. API documentation is
//! served at `/admin/docs`.

pub mod extractors;
pub mod handlers;
pub mod models;
