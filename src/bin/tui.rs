use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::{io, time::Duration};
use std::sync::{Arc, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use rb_index::{Color as NodeColor, Key, RbTree};

/// Levels of the tree shown in the shape panel
const SHOWN_LEVELS: usize = 6;

/// Keys inserted per batch before stats are published
const BATCH_SIZE: u64 = 1000;

/// Reset the tree once it holds this many keys
const RESET_AT: usize = 2_000_000;

// A snapshot of the top levels to share with the UI
#[derive(Default, Clone)]
struct TreeSnapshot {
    levels: Vec<Vec<(Key, NodeColor)>>,
    black_height: usize,
    root: Option<(Key, NodeColor)>,
}

struct SharedStats {
    ops_count: AtomicU64,
    ns_per_op: AtomicU64,
    len: AtomicU64,
    height: AtomicU64,
    paused: AtomicBool,
    snapshot: RwLock<TreeSnapshot>,
}

impl SharedStats {
    fn new() -> Self {
        Self {
            ops_count: AtomicU64::new(0),
            ns_per_op: AtomicU64::new(0),
            len: AtomicU64::new(0),
            height: AtomicU64::new(0),
            paused: AtomicBool::new(false),
            snapshot: RwLock::new(TreeSnapshot::default()),
        }
    }
}

// One line per level, red nodes in red, black nodes in white
fn render_levels(levels: &[Vec<(Key, NodeColor)>]) -> Vec<Line<'static>> {
    levels
        .iter()
        .enumerate()
        .map(|(depth, level)| {
            let mut spans = vec![Span::raw(format!("{:>2} | ", depth))];
            for (key, color) in level.iter().take(16) {
                let style = match color {
                    NodeColor::Red => Style::default().fg(Color::Red),
                    NodeColor::Black => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                };
                spans.push(Span::styled(format!("{} ", key), style));
            }
            if level.len() > 16 {
                spans.push(Span::raw(format!("... (+{})", level.len() - 16)));
            }
            Line::from(spans)
        })
        .collect()
}

fn root_label(root: Option<(Key, NodeColor)>) -> String {
    match root {
        Some((key, NodeColor::Red)) => format!("{} (red)", key),
        Some((key, NodeColor::Black)) => format!("{} (black)", key),
        None => "-".to_string(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let stats = Arc::new(SharedStats::new());
    let stats_clone = stats.clone();

    // Spawn the inserter thread (synthetic load)
    thread::spawn(move || {
        let mut tree = RbTree::with_capacity(RESET_AT as u32);
        tree.warm_up();

        let mut rng = 12345u64; // Simple LCG for speed
        let mut loop_count = 0u64;

        loop {
            if stats_clone.paused.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(20));
                continue;
            }

            let start_batch = std::time::Instant::now();
            for _ in 0..BATCH_SIZE {
                rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
                // Use high 32 bits for better randomness (LCG low bits are poor)
                let key = (rng >> 32) as Key;
                tree.insert(key);
            }
            loop_count += 1;

            stats_clone.ops_count.fetch_add(BATCH_SIZE, Ordering::Relaxed);
            let elapsed = start_batch.elapsed();
            stats_clone
                .ns_per_op
                .store(elapsed.as_nanos() as u64 / BATCH_SIZE, Ordering::Relaxed);
            stats_clone.len.store(tree.len() as u64, Ordering::Relaxed);

            // Publish a snapshot every 50 batches
            if loop_count % 50 == 0 {
                stats_clone.height.store(tree.height() as u64, Ordering::Relaxed);
                let black_height = tree.black_height();
                if let Ok(mut guard) = stats_clone.snapshot.write() {
                    guard.levels = tree.levels(SHOWN_LEVELS);
                    guard.black_height = black_height;
                    guard.root = tree.root();
                }
            }

            if tree.len() >= RESET_AT {
                tree.clear(); // Hard reset for demo loop
            }
        }
    });

    // Run TUI loop
    let mut last_ops = 0;
    let mut last_time = std::time::Instant::now();
    let mut throughput = 0.0;

    loop {
        // Handle input
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char(' ') => {
                        let paused = stats.paused.load(Ordering::Relaxed);
                        stats.paused.store(!paused, Ordering::Relaxed);
                    }
                    _ => {}
                }
            }
        }

        let now = std::time::Instant::now();
        if now.duration_since(last_time).as_secs_f64() >= 1.0 {
            let current_ops = stats.ops_count.load(Ordering::Relaxed);
            throughput = (current_ops - last_ops) as f64;
            last_ops = current_ops;
            last_time = now;
        }

        let snapshot = match stats.snapshot.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints(
                    [
                        Constraint::Length(3),  // Header
                        Constraint::Min(10),    // Tree shape
                        Constraint::Length(9),  // Stats
                    ]
                    .as_ref(),
                )
                .split(f.size());

            // 1. Header
            let header = Block::default().borders(Borders::ALL).title("RB-INDEX Live Insert Demo");
            let title = Paragraph::new("Random i64 keys | 'space' pause | 'q' quit")
                .block(header)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Cyan));
            f.render_widget(title, chunks[0]);

            // 2. Tree shape
            let shape = Paragraph::new(render_levels(&snapshot.levels)).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("TOP {} LEVELS", SHOWN_LEVELS)),
            );
            f.render_widget(shape, chunks[1]);

            // 3. Stats
            let ops_fmt = if throughput > 1_000_000.0 {
                format!("{:.2} M", throughput / 1_000_000.0)
            } else {
                format!("{:.0} k", throughput / 1_000.0)
            };

            let len = stats.len.load(Ordering::Relaxed);
            let height = stats.height.load(Ordering::Relaxed);
            let bound = 2.0 * ((len as f64) + 1.0).log2();
            let latency = stats.ns_per_op.load(Ordering::Relaxed);
            let state = if stats.paused.load(Ordering::Relaxed) { "paused" } else { "running" };
            let root = root_label(snapshot.root);

            let stats_text = format!(
                "Throughput: {} inserts/sec ({})\nLatency (Avg Batch): {} ns\nKeys: {}\nHeight: {} (bound {:.1})\nBlack height: {}\nRoot: {}",
                ops_fmt, state, latency, len, height, bound, snapshot.black_height, root
            );

            let stats_block = Paragraph::new(stats_text)
                .block(Block::default().borders(Borders::ALL).title("Tree Telemetry"))
                .style(Style::default().fg(Color::Yellow));
            f.render_widget(stats_block, chunks[2]);
        })?;
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_label() {
        let tree: RbTree = [0_i64, 1, 6, 3, 2, 4].into_iter().collect();
        assert_eq!(root_label(tree.root()), "1 (black)");
        assert_eq!(root_label(RbTree::new().root()), "-");
        assert_eq!(root_label(Some((7, NodeColor::Red))), "7 (red)");
    }
}
