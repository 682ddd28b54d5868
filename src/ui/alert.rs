//! 用户提示
//!
//! 阻塞式错误提示，终端下输出到 stderr 并等待确认

use std::io::{self, BufRead, IsTerminal, Write};

use tokio::runtime::{Handle, RuntimeFlavor};

pub trait Alert: Send + Sync {
    fn alert(&self, message: &str);
}

/// 终端提示：交互式终端下等待回车，否则直接返回
#[derive(Debug, Default)]
pub struct TerminalAlert;

impl Alert for TerminalAlert {
    fn alert(&self, message: &str) {
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "\n  ⚠ {}", message);

        if io::stdin().is_terminal() {
            let _ = write!(stderr, "  Press Enter to continue...");
            let _ = stderr.flush();
            drop(stderr);
            wait_blocking(|| {
                let mut line = String::new();
                let _ = io::stdin().lock().read_line(&mut line);
            });
        }
    }
}

/// 在多线程运行时内阻塞时先让出工作线程，current_thread 运行时下 block_in_place 会 panic
fn wait_blocking<F: FnOnce() -> R, R>(f: F) -> R {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

/// 记录所有提示内容（测试用）
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingAlert {
    messages: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingAlert {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }
}

#[cfg(test)]
impl Alert for RecordingAlert {
    fn alert(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}
