//! Headless tray: icon and tooltip changes go to the log, menu items are
//! typed on stdin.

use log::{info, trace, warn};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;

use super::PresentationSink;
use crate::animation::icons::Frame;
use crate::system::process_viewer;

pub struct ConsoleSink {
    title: String,
    released: AtomicBool,
}

impl ConsoleSink {
    pub fn new(title: &str) -> Self {
        info!("[{}] Tray ready", title);
        Self {
            title: title.to_string(),
            released: AtomicBool::new(false),
        }
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl PresentationSink for ConsoleSink {
    fn set_icon(&self, frame: &Frame) {
        if self.is_released() {
            return;
        }
        trace!("[{}] Icon -> {} ({} bytes)", self.title, frame.name, frame.data.len());
    }

    fn set_tooltip(&self, text: &str) {
        if self.is_released() {
            return;
        }
        info!("[{}] {}", self.title, text);
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            info!("[{}] Tray released", self.title);
        }
    }
}

/// Tray menu entries
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MenuCommand {
    /// 任务管理器
    OpenProcessViewer,
    /// 退下吧
    Quit,
}

impl MenuCommand {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "t" | "taskmgr" | "任务管理器" => Some(Self::OpenProcessViewer),
            "q" | "quit" | "exit" | "退下吧" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Read menu commands from stdin on a detached thread.
///
/// Quit requests are forwarded to `quit_tx`; the process viewer is launched
/// in place. End of input just stops the reader.
pub fn spawn_menu_reader(quit_tx: mpsc::Sender<()>) {
    info!("Menu: [t] 任务管理器 (打开任务管理器)  [q] 退下吧 (退出应用程序)");

    let spawned = std::thread::Builder::new()
        .name("tray-menu".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match MenuCommand::parse(&line) {
                    Some(MenuCommand::OpenProcessViewer) => {
                        if let Err(e) = process_viewer::open() {
                            warn!("Failed to open process viewer: {:#}", e);
                        }
                    }
                    Some(MenuCommand::Quit) => {
                        // A full channel already holds a quit request
                        let _ = quit_tx.try_send(());
                    }
                    None if line.trim().is_empty() => {}
                    None => warn!("Unknown menu command: {}", line.trim()),
                }
            }
        });

    if let Err(e) = spawned {
        warn!("Menu unavailable: {}", e);
    }
}
