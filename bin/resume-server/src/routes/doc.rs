use crate::routes::{chat, contact, health};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "resume-server",
    description = "Streaming chat backend for an AI-powered interactive resume"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(chat::ChatApi::openapi());
    root.merge(contact::ContactApi::openapi());
    root
}
