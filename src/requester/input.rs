//! Operator input loop for `firstchar-ctl`.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::requester::Requester;
use crate::{AppError, Result};

/// Prompt written before every line is read.
pub const PROMPT: &str = "Please enter a message: ";

/// Counts reported when the input loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    /// Lines answered with a reply sentence.
    pub answered: usize,
    /// Lines the responder rejected.
    pub rejected: usize,
}

/// Read lines from `input` until end-of-input, sending each one.
///
/// Replies go to `output`, one per line. A rejected line is reported on
/// stderr and the loop continues; any other error ends it.
///
/// # Errors
///
/// Returns `AppError::Io` on stream failures, or the first request error
/// that is not an input rejection.
pub async fn run_input_loop<R, W>(
    mut input: R,
    output: &mut W,
    requester: &Requester,
) -> Result<LoopSummary>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = LoopSummary::default();
    let mut line = String::new();

    loop {
        write_flush(output, PROMPT).await?;

        line.clear();
        let read = input
            .read_line(&mut line)
            .await
            .map_err(|err| AppError::Io(format!("failed to read input: {err}")))?;
        if read == 0 {
            break;
        }

        match requester.send_first_char_request(&line).await {
            Ok(reply) => {
                write_flush(output, &format!("{reply}\n")).await?;
                summary.answered += 1;
            }
            Err(err) if err.is_input_rejection() => {
                warn!(%err, "request rejected");
                eprintln!("Error: {err}");
                summary.rejected += 1;
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        answered = summary.answered,
        rejected = summary.rejected,
        "end of input"
    );
    Ok(summary)
}

async fn write_flush<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output
        .write_all(text.as_bytes())
        .await
        .map_err(|err| AppError::Io(format!("failed to write output: {err}")))?;
    output
        .flush()
        .await
        .map_err(|err| AppError::Io(format!("failed to flush output: {err}")))
}
