// Handlers module

pub mod chat;
pub mod chats;
pub mod download;

pub use chat::{send_form_handler, send_json_handler};
pub use chats::{
    clear_chats_handler, create_chat_handler, delete_chat_handler, delete_message_handler,
    get_chat_handler, list_chats_handler, rename_chat_handler, search_chats_handler,
};
pub use download::download_handler;
