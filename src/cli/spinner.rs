// Request-in-flight spinner

use crossterm::cursor::MoveToColumn;
use crossterm::terminal::{Clear, ClearType};
use crossterm::ExecutableCommand;
use std::io::{self, Write};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const FRAMES: [char; 4] = ['◜', '◝', '◞', '◟'];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Animated wait indicator on the current line. Stopping it erases the line
/// so the reply can render where the spinner was.
pub struct Spinner {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Spinner {
    pub fn start() -> Self {
        let token = CancellationToken::new();
        let stop = token.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(FRAME_INTERVAL);
            let mut frame = 0usize;
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = interval.tick() => {
                        draw(FRAMES[frame % FRAMES.len()]);
                        frame += 1;
                    }
                }
            }
            erase_line();
        });

        Self { token, handle }
    }

    pub async fn stop(self) {
        self.token.cancel();
        let _ = self.handle.await;
    }
}

// Draw failures are ignored; the spinner must never take down a request.
fn draw(frame: char) {
    let mut stdout = io::stdout();
    let _ = stdout.execute(MoveToColumn(0));
    let _ = stdout.execute(Clear(ClearType::CurrentLine));
    let _ = write!(stdout, "{} ", frame);
    let _ = stdout.flush();
}

fn erase_line() {
    let mut stdout = io::stdout();
    let _ = stdout.execute(MoveToColumn(0));
    let _ = stdout.execute(Clear(ClearType::CurrentLine));
    let _ = stdout.flush();
}
