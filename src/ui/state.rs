/// Trạng thái cục bộ của UI, ngoài phần lõi chat.
pub struct AppState {
    /// Local path typed into the attach field.
    pub attachment_path: String,
    pub attachment_error: Option<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            attachment_path: String::new(),
            attachment_error: None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
