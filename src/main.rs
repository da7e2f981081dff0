use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::stdout;
use std::process;
use std::{env, fs};

use urlisp::io::{CharSource, StrSource, WriteSink};
use urlisp::{Error, Interp, DEFAULT_ARENA_WORDS};

/// Line-buffered interactive source. Each line is fetched through the
/// editor (history, editing keys), uppercased before the interpreter
/// sees it, and handed out a byte at a time with a trailing newline.
struct LineEditor {
    editor: DefaultEditor,
    line: Vec<u8>,
    pos: usize,
}

impl LineEditor {
    fn new() -> rustyline::Result<LineEditor> {
        Ok(LineEditor {
            editor: DefaultEditor::new()?,
            line: Vec::new(),
            pos: 0,
        })
    }
}

impl CharSource for LineEditor {
    fn next_char(&mut self) -> Option<u8> {
        loop {
            if self.pos < self.line.len() {
                let b = self.line[self.pos];
                self.pos += 1;
                return Some(b);
            }
            match self.editor.readline("* ") {
                Ok(text) => {
                    let _ = self.editor.add_history_entry(text.as_str());
                    let mut bytes = text.to_uppercase().into_bytes();
                    bytes.push(b'\n');
                    self.line = bytes;
                    self.pos = 0;
                }
                Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => return None,
                Err(err) => {
                    eprintln!("urlisp: readline: {err}");
                    return None;
                }
            }
        }
    }
}

fn usage() -> ! {
    eprintln!("usage: urlisp [--arena-words N] [FILE...]");
    process::exit(2);
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut arena_words = DEFAULT_ARENA_WORDS;
    let mut files = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--arena-words" {
            match args.next().and_then(|v| v.parse::<usize>().ok()) {
                Some(n) => arena_words = n,
                None => usage(),
            }
        } else if arg.starts_with("--") {
            usage();
        } else {
            files.push(arg);
        }
    }

    let outcome = if files.is_empty() {
        run_interactive(arena_words)
    } else {
        run_files(arena_words, &files)
    };

    if let Err(err) = outcome {
        eprintln!("urlisp: {err}");
        process::exit(1);
    }
}

fn run_interactive(arena_words: usize) -> Result<(), Error> {
    let source = match LineEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("urlisp: cannot open terminal: {err}");
            process::exit(1);
        }
    };
    let mut interp = Interp::with_arena_words(arena_words, source, WriteSink::new(stdout()));
    interp.run()
}

fn run_files(arena_words: usize, files: &[String]) -> Result<(), Error> {
    let mut text = String::new();
    for path in files {
        match fs::read_to_string(path) {
            Ok(src) => {
                text.push_str(&src);
                text.push('\n');
            }
            Err(err) => {
                eprintln!("urlisp: {path}: {err}");
                process::exit(1);
            }
        }
    }
    let source = StrSource::new(&text.to_uppercase());
    let mut interp = Interp::with_arena_words(arena_words, source, WriteSink::new(stdout()));
    interp.run()
}
