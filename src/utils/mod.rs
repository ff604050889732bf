/// Truncate text to a display-safe preview, on a char boundary.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}…")
}

/// Check if the current environment has required external tools
pub async fn check_dependencies() -> Vec<String> {
    let mut missing = Vec::new();

    // yt-dlp is only needed for the speech fallback
    if !check_command_available("yt-dlp").await {
        missing.push("yt-dlp - required for audio fallback when captions are missing".to_string());
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    use tokio::process::Command;

    Command::new(command)
        .arg("--version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
