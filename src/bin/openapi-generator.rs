//! Prints the OpenAPI document as pretty JSON.

use utoipa::OpenApi;
use watchma_back::services::documentation::ApiDoc;

fn main() {
    let doc = ApiDoc::openapi();
    match doc.to_pretty_json() {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to render OpenAPI document: {err}");
            std::process::exit(1);
        }
    }
}
