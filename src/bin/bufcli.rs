use std::collections::HashMap;

use anyhow::{Context, Result, anyhow, bail};
use bufmgr::{
    buffer::BufferManager,
    config::BufferConfig,
    db_info,
    debugger::Component,
    storage::{FileHandle, FilePageManager, InMemoryPageManager, PageId},
};
use rustyline::{DefaultEditor, error::ReadlineError};

struct Shell {
    bm: BufferManager,
    files: HashMap<String, FileHandle>,
}

impl Shell {
    fn file(&self, name: &str) -> Result<&FileHandle> {
        self.files
            .get(name)
            .ok_or_else(|| anyhow!("no file named '{}' (use mem or open)", name))
    }

    fn run(&mut self, line: &str) -> Result<()> {
        let words: Vec<&str> = line.split_whitespace().collect();

        match words.as_slice() {
            ["mem", name] | ["mem", name, _] => {
                let pages = match words.get(2) {
                    Some(n) => n.parse().context("page count")?,
                    None => 0,
                };
                let handle = FileHandle::new(InMemoryPageManager::with_pages(*name, pages));
                self.files.insert(name.to_string(), handle);
                println!("created in-memory file '{}' with {} pages", name, pages);
            }
            ["open", name, path] => {
                let handle = FileHandle::new(FilePageManager::open(path)?);
                self.files.insert(name.to_string(), handle);
                println!("opened '{}' as '{}'", path, name);
            }
            ["alloc", name] => {
                let file = self.file(name)?.clone();
                let (page_id, _) = self.bm.alloc_page(&file)?;
                println!("allocated page {} (pinned)", page_id);
            }
            ["fetch", name, pid] => {
                let file = self.file(name)?.clone();
                self.bm.fetch_page(&file, parse_page(pid)?)?;
                println!("pinned page {}", pid);
            }
            ["unpin", name, pid] | ["unpin", name, pid, "dirty"] => {
                let file = self.file(name)?.clone();
                let dirty = words.len() == 4;
                self.bm.unpin_page(&file, parse_page(pid)?, dirty)?;
            }
            ["write", name, pid, offset, text @ ..] if !text.is_empty() => {
                let file = self.file(name)?.clone();
                let page_id = parse_page(pid)?;
                let offset: usize = offset.parse().context("offset")?;
                let n = self
                    .bm
                    .fetch_page(&file, page_id)?
                    .write_at(offset, text.join(" ").as_bytes());
                self.bm.unpin_page(&file, page_id, true)?;
                println!("wrote {} bytes", n);
            }
            ["read", name, pid] | ["read", name, pid, _] => {
                let file = self.file(name)?.clone();
                let page_id = parse_page(pid)?;
                let len: usize = match words.get(3) {
                    Some(n) => n.parse().context("length")?,
                    None => 32,
                };
                let page = self.bm.fetch_page(&file, page_id)?;
                let bytes = &page.data[..len.min(page.data.len())];
                println!("{:?}", String::from_utf8_lossy(bytes));
                self.bm.unpin_page(&file, page_id, false)?;
            }
            ["dispose", name, pid] => {
                let file = self.file(name)?.clone();
                self.bm.dispose_page(&file, parse_page(pid)?)?;
            }
            ["flush", name] => {
                let file = self.file(name)?.clone();
                self.bm.flush_file(&file)?;
            }
            ["show"] => println!("{}", self.bm),
            ["stats"] => println!("{}", self.bm.stats()),
            _ => bail!("unrecognized command, try .help"),
        }
        Ok(())
    }
}

fn parse_page(s: &str) -> Result<PageId> {
    Ok(PageId(s.parse().with_context(|| format!("bad page id '{}'", s))?))
}

fn print_help() {
    println!("  mem <name> [pages]            create an in-memory page file");
    println!("  open <name> <path>            open a page file on disk");
    println!("  alloc <name>                  allocate a page (left pinned)");
    println!("  fetch <name> <page>           pin a page");
    println!("  unpin <name> <page> [dirty]   release a pin");
    println!("  write <name> <page> <off> <text>");
    println!("  read <name> <page> [len]");
    println!("  dispose <name> <page>         delete a page");
    println!("  flush <name>                  write back a file's dirty pages");
    println!("  show | stats | .help | .exit");
}

fn main() -> Result<()> {
    let (config, _) = BufferConfig::from_args(std::env::args().skip(1))?;
    let mut shell = Shell {
        bm: BufferManager::with_config(&config)?,
        files: HashMap::new(),
    };
    db_info!(Component::Cli, "buffer pool with {} frames", config.frames);

    let mut rl = DefaultEditor::new()?;
    println!("bufmgr shell ({} frames). Type .help for commands", config.frames);

    loop {
        match rl.readline("bufmgr> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line).ok();

                match line {
                    ".exit" => break,
                    ".help" => print_help(),
                    _ => {
                        if let Err(e) = shell.run(line) {
                            println!("error: {:#}", e);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }

    shell.bm.close()?;
    Ok(())
}
