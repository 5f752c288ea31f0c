//! Line-oriented driver over the workbench: one command per stdin line.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use deskcore::app::Workbench;
use deskcore::kernel::services::adapters::{load_settings, LocalHost};
use deskcore::kernel::services::ports::{HostRuntime, SessionId, Settings, ShellKind};
use deskcore::kernel::state::NotificationLevel;
use deskcore::kernel::{Action, DocumentId, OutputKind};

mod logging;

const QUIET: Duration = Duration::from_millis(50);
const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(60);

const HELP: &str = "\
commands:
  open <file>      folder <dir>     expand <dir>    tree
  tabs             focus <id>       close [id]      edit <text>
  save             saveas <path>    new <name>
  term [shell]     run <cmd>        sessions        out
  kill <id>        help             quit";

fn main() -> Result<()> {
    let _logging = logging::init();

    let settings = load_settings().unwrap_or_else(|err| {
        eprintln!("warning: {err:#}; using default settings");
        tracing::warn!(error = %err, "settings load failed");
        Settings::default()
    });

    let host = Arc::new(LocalHost::from_settings(&settings));
    let run_timeout = settings
        .shell
        .command_timeout()
        .map(|t| t + Duration::from_secs(1))
        .unwrap_or(DEFAULT_RUN_TIMEOUT);
    let runtime: Arc<dyn HostRuntime> = host.clone();
    let mut workbench =
        Workbench::with_runtime(settings, runtime).context("failed to start host runtime")?;

    for arg in std::env::args().skip(1) {
        let path = absolute(Path::new(&arg))?;
        let action = if path.is_dir() {
            Action::OpenFolder(path)
        } else {
            Action::OpenPath(path)
        };
        workbench.dispatch(action);
    }
    workbench.settle(QUIET, SETTLE_TIMEOUT);

    let mut driver = Driver {
        workbench,
        host,
        run_timeout,
    };
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    prompt(&mut stdout)?;
    for line in stdin.lock().lines() {
        let line = line.context("failed to read stdin")?;
        match driver.execute(line.trim()) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(err) => println!("error: {err:#}"),
        }
        driver.print_notifications();
        prompt(&mut stdout)?;
    }

    tracing::info!("exiting");
    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

struct Driver {
    workbench: Workbench,
    host: Arc<LocalHost>,
    run_timeout: Duration,
}

impl Driver {
    fn execute(&mut self, line: &str) -> Result<Flow> {
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, arg)) => (cmd, arg.trim()),
            None => (line, ""),
        };

        match cmd {
            "" => {}
            "quit" | "exit" => return Ok(Flow::Quit),
            "help" => println!("{HELP}"),
            "open" => {
                let path = absolute(Path::new(required(arg, "open <file>")?))?;
                self.apply(Action::OpenPath(path));
            }
            "folder" => {
                let path = absolute(Path::new(required(arg, "folder <dir>")?))?;
                self.apply(Action::OpenFolder(path));
                self.print_tree();
            }
            "expand" => {
                let path = self.tree_path(required(arg, "expand <dir>")?);
                self.apply(Action::ToggleDirectory(path));
                self.print_tree();
            }
            "tree" => self.print_tree(),
            "tabs" => self.print_tabs(),
            "focus" => {
                let id = DocumentId::new(required(arg, "focus <id>")?);
                self.apply(Action::FocusDocument(id));
                self.print_tabs();
            }
            "close" => {
                let id = match arg {
                    "" => self.active_document()?,
                    id => DocumentId::new(id),
                };
                self.apply(Action::CloseDocument(id));
                self.print_tabs();
            }
            "edit" => {
                let id = self.active_document()?;
                let text = arg.replace("\\n", "\n");
                self.apply(Action::UpdateContent { id, text });
            }
            "save" => self.apply(Action::SaveActive),
            "saveas" => {
                let path = absolute(Path::new(required(arg, "saveas <path>")?))?;
                self.host.queue_dialog_answer(path);
                self.apply(Action::SaveActiveAs);
                self.print_tabs();
            }
            "new" => {
                self.apply(Action::NewFile {
                    name: arg.to_string(),
                });
                self.print_tabs();
            }
            "term" => {
                let shell = match arg {
                    "" => None,
                    name => Some(name.parse::<ShellKind>().map_err(anyhow::Error::msg)?),
                };
                self.apply(Action::NewSession {
                    shell,
                    working_directory: None,
                });
                self.print_sessions();
            }
            "run" => self.run(required(arg, "run <cmd>")?)?,
            "sessions" => self.print_sessions(),
            "out" => self.print_output(),
            "kill" => {
                let id = required(arg, "kill <id>")?
                    .parse::<u64>()
                    .context("session id must be a number")?;
                self.apply(Action::CloseSession(SessionId(id)));
                self.print_sessions();
            }
            other => println!("unknown command: {other} (try `help`)"),
        }
        Ok(Flow::Continue)
    }

    fn apply(&mut self, action: Action) {
        self.workbench.dispatch(action);
        self.workbench.settle(QUIET, SETTLE_TIMEOUT);
    }

    fn run(&mut self, command: &str) -> Result<()> {
        let session = self
            .workbench
            .state()
            .terminal
            .active_id()
            .context("no session; start one with `term`")?;
        let before = self
            .workbench
            .state()
            .terminal
            .get(session)
            .map(|s| s.output().len())
            .unwrap_or(0);

        self.workbench.dispatch(Action::SubmitCommand {
            session,
            text: command.to_string(),
        });
        let finished = self.workbench.pump_until(self.run_timeout, |state| {
            state
                .terminal
                .get(session)
                .map_or(true, |s| !s.is_busy())
        });
        if !finished {
            println!("(still running)");
        }
        self.workbench.settle(QUIET, SETTLE_TIMEOUT);

        if let Some(s) = self.workbench.state().terminal.get(session) {
            for entry in s.output().iter().skip(before + 1) {
                print_entry(entry.kind, &entry.text);
            }
        }
        Ok(())
    }

    fn active_document(&self) -> Result<DocumentId> {
        self.workbench
            .state()
            .documents
            .active_id()
            .cloned()
            .context("no document open")
    }

    fn tree_path(&self, arg: &str) -> PathBuf {
        let path = Path::new(arg);
        match self.workbench.state().explorer.root_path() {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn print_tree(&self) {
        let explorer = &self.workbench.state().explorer;
        let Some(root) = explorer.root_path() else {
            println!("(no folder open)");
            return;
        };
        println!("{}", root.display());
        for row in explorer.visible_rows() {
            let marker = match (row.is_dir, row.expanded, row.loading) {
                (false, _, _) => ' ',
                (true, _, true) => '~',
                (true, true, false) => '-',
                (true, false, false) => '+',
            };
            let indent = "  ".repeat(usize::from(row.depth) + 1);
            let suffix = if row.empty { "  (empty)" } else { "" };
            println!("{indent}{marker} {}{suffix}", row.name);
        }
    }

    fn print_tabs(&self) {
        let documents = &self.workbench.state().documents;
        if documents.is_empty() {
            println!("(no documents)");
            return;
        }
        let active = documents.active_id();
        for doc in documents.iter() {
            let mark = if Some(&doc.id) == active { '>' } else { ' ' };
            let dirty = if doc.dirty { "*" } else { "" };
            println!(
                "{mark} {}{dirty}  [{}]  {}",
                doc.name,
                doc.language().display_name(),
                doc.id
            );
        }
    }

    fn print_sessions(&self) {
        let terminal = &self.workbench.state().terminal;
        if terminal.is_empty() {
            println!("(no sessions)");
            return;
        }
        let active = terminal.active_id();
        for session in terminal.iter() {
            let mark = if Some(session.id) == active { '>' } else { ' ' };
            println!(
                "{mark} {}  {}",
                session.title(),
                session.working_directory.display()
            );
        }
    }

    fn print_output(&self) {
        match self.workbench.state().terminal.active_session() {
            Some(session) => {
                for entry in session.output() {
                    print_entry(entry.kind, &entry.text);
                }
            }
            None => println!("(no sessions)"),
        }
    }

    fn print_notifications(&mut self) {
        for note in self.workbench.take_notifications() {
            let label = match note.level {
                NotificationLevel::Info => "info",
                NotificationLevel::Warning => "warning",
                NotificationLevel::Error => "error",
            };
            println!("[{label}] {}", note.message);
        }
    }
}

fn print_entry(kind: OutputKind, text: &str) {
    match kind {
        OutputKind::Command => println!("{text}"),
        OutputKind::Output => {
            if !text.is_empty() {
                println!("{text}");
            }
        }
        OutputKind::Error => println!("! {text}"),
    }
}

fn required<'a>(arg: &'a str, usage: &str) -> Result<&'a str> {
    if arg.is_empty() {
        anyhow::bail!("usage: {usage}");
    }
    Ok(arg)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("cannot resolve current directory")?;
    Ok(cwd.join(path))
}

fn prompt(stdout: &mut io::Stdout) -> Result<()> {
    print!("deskcore> ");
    stdout.flush().context("failed to flush stdout")?;
    Ok(())
}
