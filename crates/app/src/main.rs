mod screen;

use std::fmt;
use std::future;
use std::pin::Pin;
use std::time::Duration;

use log::{info, warn};
use quiz_core::model::QuizSettings;
use services::{
    LlmQuestionProvider, QuestionProvider, SessionController, SessionEvent, StaticQuestionProvider,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use screen::{Input, parse_input, render};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidNumber { flag: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number<T: std::str::FromStr>(raw: String, flag: &'static str) -> Result<T, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidNumber { flag, raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--questions <n>] [--delay-ms <ms>] [--shuffle] [--offline]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --questions 20");
    eprintln!("  --delay-ms 1500");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_PRACTICE_COUNT, QUIZ_RESULT_DELAY_MS");
    eprintln!("  QUIZ_AI_API_KEY, QUIZ_AI_BASE_URL, QUIZ_AI_MODEL, QUIZ_AI_TIMEOUT_SECS");
    eprintln!("  RUST_LOG (e.g. RUST_LOG=debug)");
}

struct Args {
    practice_count: Option<u32>,
    delay_ms: Option<u64>,
    shuffle: bool,
    offline: bool,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            practice_count: env_number("QUIZ_PRACTICE_COUNT"),
            delay_ms: env_number("QUIZ_RESULT_DELAY_MS"),
            shuffle: false,
            offline: false,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--questions" => {
                    let value = require_value(args, "--questions")?;
                    parsed.practice_count = Some(parse_number(value, "--questions")?);
                }
                "--delay-ms" => {
                    let value = require_value(args, "--delay-ms")?;
                    parsed.delay_ms = Some(parse_number(value, "--delay-ms")?);
                }
                "--shuffle" => parsed.shuffle = true,
                "--offline" => parsed.offline = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn settings(&self) -> Result<QuizSettings, quiz_core::Error> {
        let mut settings = QuizSettings::default();
        if let Some(count) = self.practice_count {
            settings = settings.with_practice_question_count(count)?;
        }
        if let Some(ms) = self.delay_ms {
            settings = settings.with_result_delay(Duration::from_millis(ms));
        }
        Ok(settings)
    }
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("ignoring {key}={raw}: not a number");
            None
        }
    }
}

type PendingEffect = Pin<Box<dyn Future<Output = SessionEvent> + Send>>;

async fn next_completion(pending: &mut Option<PendingEffect>) -> SessionEvent {
    match pending.as_mut() {
        Some(effect) => effect.await,
        None => future::pending().await,
    }
}

async fn drive<P: QuestionProvider + 'static>(
    mut controller: SessionController<P>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<PendingEffect> = None;
    print!("{}", render(&controller.view()));

    loop {
        tokio::select! {
            completion = next_completion(&mut pending) => {
                pending = None;
                if let Some(effect) = controller.handle(completion) {
                    pending = Some(Box::pin(controller.perform(effect)));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(());
                };
                match parse_input(&line, &controller.view()) {
                    Input::Quit => return Ok(()),
                    Input::Unrecognized => {
                        println!("?");
                        continue;
                    }
                    Input::Event(event) => {
                        if let Some(effect) = controller.handle(event) {
                            pending = Some(Box::pin(controller.perform(effect)));
                        }
                    }
                }
            }
        }
        print!("{}", render(&controller.view()));
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let settings = parsed.settings()?;

    if parsed.offline {
        info!("using the bundled question bank");
        let controller = SessionController::new(StaticQuestionProvider::sample()?, settings)
            .with_shuffle(parsed.shuffle);
        return drive(controller).await;
    }

    let provider = LlmQuestionProvider::from_env();
    if !provider.enabled() {
        eprintln!(
            "QUIZ_AI_API_KEY is not set; question requests will fail. \
             Use --offline for the bundled question bank."
        );
    }
    let controller = SessionController::new(provider, settings).with_shuffle(parsed.shuffle);
    drive(controller).await
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
