use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use emoti_gauge::auth::{LoginForm, RegisterForm, Session};
use emoti_gauge::commands::auth::LoginOutcome;
use emoti_gauge::commands::create::NewQuestion;
use emoti_gauge::commands::{self, CommandError};
use emoti_gauge::draft::Confirm;
use emoti_gauge::gateway::HttpGateway;
use emoti_gauge::logging;
use emoti_gauge::render::helpers::write_string;
use emoti_gauge::settings::{load_settings, resolve_data_dir, Settings};
use emoti_gauge::storage::{KeyValueStore, SqliteStore};
use emoti_gauge::survey::{QuestionType, SurveyQuestion};

#[derive(Parser)]
#[command(name = "emoti-gauge", version, about = "Create surveys, share them and collect answers")]
struct Cli {
  /// Directory holding settings.json and the local store.
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,
  /// Answer yes to every confirmation prompt.
  #[arg(long, short = 'y', global = true)]
  yes: bool,
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  Register {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
  },
  Login {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
  },
  Logout,
  Verify {
    token: String,
  },
  ResendVerification {
    #[arg(long)]
    email: String,
  },
  ForgotPassword {
    #[arg(long)]
    email: String,
  },
  ResetPassword {
    token: String,
    #[arg(long)]
    password: String,
  },
  #[command(subcommand)]
  Avatar(AvatarCommand),
  Dashboard,
  #[command(subcommand)]
  Draft(DraftCommand),
  #[command(subcommand)]
  Survey(SurveyCommand),
  /// Answer a published survey interactively.
  Take {
    link: String,
  },
  /// Public results of a survey, as returned by the API.
  Results {
    link: String,
  },
}

#[derive(Subcommand)]
enum AvatarCommand {
  Upload { path: PathBuf },
  Remove,
}

#[derive(Subcommand)]
enum DraftCommand {
  Show,
  New {
    title: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    no_anonymous: bool,
  },
  AddQuestion(QuestionArgs),
  Move {
    from: usize,
    to: usize,
  },
  RemoveQuestion {
    number: usize,
  },
  Clear,
  Submit {
    #[arg(long)]
    cover: Option<PathBuf>,
  },
}

#[derive(Args)]
struct QuestionArgs {
  text: String,
  #[arg(long = "type", default_value = "text")]
  question_type: QuestionType,
  #[arg(long)]
  required: bool,
  #[arg(long = "option")]
  options: Vec<String>,
}

#[derive(Subcommand)]
enum SurveyCommand {
  Show {
    id: String,
    /// Also write the report to this file.
    #[arg(long)]
    out: Option<PathBuf>,
  },
  Stats {
    id: String,
  },
  Toggle {
    id: String,
  },
  RegenerateLink {
    id: String,
  },
  RemoveCover {
    id: String,
  },
  Delete {
    id: String,
  },
}

struct Prompt {
  assume_yes: bool,
}

/// Reads one line without stalling the runtime's worker thread.
/// `None` on end of input or a read error.
fn read_line_blocking<R: BufRead>(reader: &mut R) -> Option<String> {
  tokio::task::block_in_place(|| {
    let mut line = String::new();
    match reader.read_line(&mut line) {
      Ok(0) | Err(_) => None,
      Ok(_) => Some(line),
    }
  })
}

impl Confirm for Prompt {
  fn confirm(&self, prompt: &str) -> bool {
    if self.assume_yes {
      return true;
    }
    eprint!("{prompt} [y/N] ");
    let _ = io::stderr().flush();
    let Some(line) = read_line_blocking(&mut io::stdin().lock()) else {
      return false;
    };
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes" | "т" | "так")
  }
}

fn ask(question: &SurveyQuestion, issue: Option<&str>) -> Option<String> {
  let q = &question.question;
  if let Some(issue) = issue {
    eprintln!("! {issue}");
  }
  let marker = if q.required { " *" } else { "" };
  println!("{}{} ({})", q.question_text, marker, q.question_type.label());
  for (i, option) in q.options.iter().enumerate() {
    println!("  {}. {option}", i + 1);
  }
  match q.question_type {
    QuestionType::Rating => print!("1-5> "),
    QuestionType::Checkbox => print!("1,2,...> "),
    _ => print!("> "),
  }
  let _ = io::stdout().flush();
  read_line_blocking(&mut io::stdin().lock())
    .filter(|line| !line.trim().is_empty())
    .map(|line| line.trim_end().to_string())
}

fn print_json(value: &serde_json::Value) -> Result<(), CommandError> {
  let pretty = serde_json::to_string_pretty(value).map_err(|e| CommandError::Invalid(e.to_string()))?;
  println!("{pretty}");
  Ok(())
}

async fn dispatch(
  command: Command,
  settings: &Settings,
  gateway: &HttpGateway,
  store: Arc<dyn KeyValueStore>,
  prompt: &Prompt,
) -> Result<(), CommandError> {
  let session = gateway.session();
  match command {
    Command::Register { username, email, password } => {
      let form = RegisterForm { username, email, password };
      println!("{}", commands::auth::register(gateway, &form).await?);
    }
    Command::Login { email, password } => {
      let form = LoginForm { email, password };
      match commands::auth::login(gateway, &form).await? {
        LoginOutcome::SignedIn(user) => println!("Успішний вхід! Вітаємо, {}", user.username),
        LoginOutcome::VerificationRequired { message } => {
          eprintln!("{message}");
          if prompt.confirm("Відправити лист підтвердження ще раз?") {
            println!("{}", commands::auth::resend_verification(gateway, &form).await?);
          }
        }
      }
    }
    Command::Logout => {
      if commands::auth::logout(session, prompt)? {
        println!("Ви вийшли з облікового запису");
      }
    }
    Command::Verify { token } => println!("{}", commands::auth::verify_email(gateway, &token).await?),
    Command::ResendVerification { email } => {
      let form = LoginForm { email, password: String::new() };
      println!("{}", commands::auth::resend_verification(gateway, &form).await?);
    }
    Command::ForgotPassword { email } => {
      println!("{}", commands::auth::forgot_password(gateway, &email).await?)
    }
    Command::ResetPassword { token, password } => {
      println!("{}", commands::auth::reset_password(gateway, &token, &password).await?)
    }
    Command::Avatar(AvatarCommand::Upload { path }) => {
      match commands::auth::upload_avatar(gateway, &path).await? {
        Some(avatar) => println!("{}", avatar.url),
        None => println!("Аватар оновлено"),
      }
    }
    Command::Avatar(AvatarCommand::Remove) => {
      commands::auth::remove_avatar(gateway).await?;
      println!("Аватар видалено");
    }
    Command::Dashboard => {
      let dashboard = commands::dashboard::load(gateway).await?;
      print!("{}", dashboard.render()?);
    }
    Command::Draft(draft) => match draft {
      DraftCommand::Show => print!("{}", commands::create::show(store)),
      DraftCommand::New { title, description, no_anonymous } => {
        commands::create::new_draft(store, &title, description.as_deref(), !no_anonymous)?;
        println!("Чернетку збережено");
      }
      DraftCommand::AddQuestion(args) => {
        let question = NewQuestion {
          text: args.text,
          question_type: args.question_type,
          required: args.required,
          options: args.options,
        };
        let index = commands::create::add_question(store, &question)?;
        println!("Питання {} додано", index + 1);
      }
      DraftCommand::Move { from, to } => {
        let landed = commands::create::move_question(store, from.saturating_sub(1), to.saturating_sub(1))?;
        println!("Питання тепер на позиції {}", landed + 1);
      }
      DraftCommand::RemoveQuestion { number } => {
        if commands::create::remove_question(store, number.saturating_sub(1), prompt)? {
          println!("Питання видалено");
        }
      }
      DraftCommand::Clear => {
        commands::create::clear(store)?;
        println!("Чернетку очищено");
      }
      DraftCommand::Submit { cover } => {
        let created = commands::create::submit(gateway, session, store, cover.as_deref()).await?;
        println!("Опитування створено! [{}] {}", created.id, created.title);
      }
    },
    Command::Survey(survey) => match survey {
      SurveyCommand::Show { id, out } => {
        let detail = commands::detail::load(gateway, &id).await?;
        let report = detail.render(&settings.public_origin)?;
        if let Some(path) = out {
          write_string(&path, &report)?;
        }
        print!("{report}");
      }
      SurveyCommand::Stats { id } => print_json(&commands::detail::stats(gateway, &id).await?)?,
      SurveyCommand::Toggle { id } => {
        let mut detail = commands::detail::load(gateway, &id).await?;
        println!("{}", commands::detail::toggle_active(gateway, &mut detail).await?);
      }
      SurveyCommand::RegenerateLink { id } => {
        let mut detail = commands::detail::load(gateway, &id).await?;
        if commands::detail::regenerate_link(gateway, &mut detail, prompt).await?.is_some() {
          println!("Нове посилання згенеровано");
          println!("{}", detail.public_link(&settings.public_origin)?);
        }
      }
      SurveyCommand::RemoveCover { id } => {
        commands::detail::remove_cover(gateway, &id).await?;
        println!("Обкладинку видалено");
      }
      SurveyCommand::Delete { id } => {
        if commands::detail::delete(gateway, &id, prompt).await? {
          println!("Опитування видалено");
        }
      }
    },
    Command::Take { link } => {
      let summary = commands::take::run(gateway, &link, ask).await?;
      println!(
        "Дякуємо! Відповіді на \"{}\" надіслано ({}/{} питань, {})",
        summary.title, summary.answered, summary.total, summary.elapsed
      );
    }
    Command::Results { link } => print_json(&commands::take::results(gateway, &link).await?)?,
  }
  Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  let data_dir = resolve_data_dir(cli.data_dir);
  let settings = match load_settings(&data_dir) {
    Ok(settings) => settings,
    Err(err) => {
      eprintln!("{err}");
      return ExitCode::FAILURE;
    }
  };
  logging::init(&settings.log_filter_or_default());

  let store: Arc<dyn KeyValueStore> = match SqliteStore::open(&settings.store_path()) {
    Ok(store) => Arc::new(store),
    Err(err) => {
      tracing::error!(error = %err, "unable to open local store");
      eprintln!("{err}");
      return ExitCode::FAILURE;
    }
  };
  let session = Session::new(Arc::clone(&store));
  let gateway = match HttpGateway::from_settings(&settings, session) {
    Ok(gateway) => gateway,
    Err(err) => {
      eprintln!("{err}");
      return ExitCode::FAILURE;
    }
  };
  let prompt = Prompt { assume_yes: cli.yes };

  match dispatch(cli.command, &settings, &gateway, store, &prompt).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      tracing::debug!(error = ?err, "command failed");
      eprintln!("{err}");
      ExitCode::FAILURE
    }
  }
}

#[cfg(test)]
mod tests {
  use super::read_line_blocking;
  use std::io::Cursor;

  #[tokio::test(flavor = "multi_thread")]
  async fn reads_lines_inside_the_runtime() {
    let mut input = Cursor::new("так\n2,3\n");
    assert_eq!(read_line_blocking(&mut input).as_deref(), Some("так\n"));
    assert_eq!(read_line_blocking(&mut input).as_deref(), Some("2,3\n"));
    assert_eq!(read_line_blocking(&mut input), None);
  }
}
