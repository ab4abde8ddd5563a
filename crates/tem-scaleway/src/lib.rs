//! Scaleway Transactional Email backend
//!
//! Delivers [`tem_core::EmailMessage`]s through the TEM HTTP API: one JSON `POST`
//! per message, authenticated with the `X-Auth-Token` header. Attachments are
//! checked against the content types TEM accepts before anything is sent.
//!
//! Settings:
//!
//! | Key | Required | Description |
//! |-----|----------|-------------|
//! | `SCALEWAY_EMAIL_PROJECT_ID` | Yes | Project the emails are billed to |
//! | `SCALEWAY_EMAIL_API_KEY` | Yes | IAM secret key |
//! | `SCALEWAY_EMAIL_API_URL` | No | Full emails endpoint, overrides the region |
//! | `SCALEWAY_EMAIL_REGION` | No | Region of the default endpoint (default: `fr-par`) |
//! | `SCALEWAY_EMAIL_TIMEOUT` | No | Request timeout in seconds (default: 30) |

pub mod attachments;
pub mod backend;
pub mod config;
pub mod errors;
pub mod payload;
pub mod plugin;

pub use backend::ScalewayBackend;
pub use config::ScalewayConfig;
pub use errors::ScalewayEmailError;
pub use payload::{build_payload, ScalewayEmailResponse, ScalewaySendEmailRequest};
pub use plugin::ScalewayPlugin;
