use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use docchat::llm::{GenerateRequest, GenerateResponse, LlmError, LlmProvider};
use docchat::routes::configure_routes;
use docchat::service::ChatService;
use docchat::state::AppState;
use docchat::store::{ChatStore, InMemoryChatStore};
use docchat::uploads::UploadDir;

/// Upload limit used by the test server
pub const TEST_MAX_UPLOAD_BYTES: u64 = 1024 * 1024;

/// Model stand-in: fixed reply or a failure, recording every prompt
pub struct ScriptedProvider {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError> {
        self.prompts
            .lock()
            .extend(request.messages.into_iter().map(|m| m.text));
        match &self.reply {
            Some(reply) => Ok(GenerateResponse::text(reply.clone())),
            None => Err(LlmError::HttpError {
                status: 500,
                body: "model unavailable".to_string(),
            }),
        }
    }
}

/// A server running on a free local port
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub provider: Arc<ScriptedProvider>,
    pub uploads: UploadDir,
    _downloads: tempfile::TempDir,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Number of files in the downloads directory
    pub fn stored_files(&self) -> usize {
        std::fs::read_dir(self.uploads.root()).unwrap().count()
    }
}

/// Start the full route tree backed by an empty store and `provider`
pub async fn spawn_app(provider: Arc<ScriptedProvider>) -> TestApp {
    spawn_app_with_limit(provider, TEST_MAX_UPLOAD_BYTES).await
}

/// Same as `spawn_app` with a custom request body limit
pub async fn spawn_app_with_limit(
    provider: Arc<ScriptedProvider>,
    max_upload_bytes: u64,
) -> TestApp {
    let downloads = tempfile::tempdir().unwrap();
    let uploads = UploadDir::new(downloads.path());

    let store: Arc<dyn ChatStore> = Arc::new(InMemoryChatStore::new());
    let chat = ChatService::new(store.clone(), provider.clone(), uploads.clone());
    let state = AppState::new(store, chat, uploads.clone(), max_upload_bytes);

    let addr = free_local_addr();
    tokio::spawn(warp::serve(configure_routes(state)).run(addr));
    wait_until_listening(addr).await;

    TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        provider,
        uploads,
        _downloads: downloads,
    }
}

fn free_local_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

async fn wait_until_listening(addr: SocketAddr) {
    for _ in 0..100 {
        if TcpStream::connect(addr).is_ok() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("server did not start on {}", addr);
}

/// Build a .docx with one paragraph per line
pub fn docx_with_lines(lines: &[&str]) -> Vec<u8> {
    use docx_rs::{Docx, Paragraph, Run};

    let docx = lines.iter().fold(Docx::new(), |docx, line| {
        docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*line)))
    });
    let mut buffer = std::io::Cursor::new(Vec::new());
    docx.build().pack(&mut buffer).unwrap();
    buffer.into_inner()
}

/// Build a .pptx with one title shape per slide
pub fn pptx_with_slides(titles: &[&str]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file("[Content_Types].xml", FileOptions::default())
        .unwrap();
    writer.write_all(b"<Types/>").unwrap();
    for (index, title) in titles.iter().enumerate() {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree><p:sp><p:nvSpPr><p:cNvPr id="2" name="Title"/></p:nvSpPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#,
            title
        );
        writer
            .start_file(
                format!("ppt/slides/slide{}.xml", index + 1),
                FileOptions::default(),
            )
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
