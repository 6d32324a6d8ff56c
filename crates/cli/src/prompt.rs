//! Line prompts on the controlling terminal

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Print `question` and read one line from `reader`; EOF reads as an empty answer.
///
/// Callers keep one reader per session: a buffered reader dropped between
/// prompts loses whatever input it had already pulled in.
pub async fn ask_from<R>(reader: &mut R, question: &str) -> std::io::Result<String>
where
    R: AsyncBufRead + Unpin,
{
    print!("{}", question);
    std::io::stdout().flush()?;

    let mut line = String::new();
    reader.read_line(&mut line).await?;
    Ok(line.trim().to_string())
}

/// `y` or `Y` accepts; anything else, including an empty answer, declines
pub fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
