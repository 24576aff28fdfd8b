mod tui;

use std::fs::{self, File};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args as ClapArgs, Parser, Subcommand};
use dotenvy::dotenv;
use log::{info, warn};

use liftlog::auth::AuthSession;
use liftlog::config::Config;
use liftlog::db::models::{NewBodyMetric, NewWorkoutEntry, Settings};
use liftlog::limits;
use liftlog::logging::{LogSink, init_logger, parse_level};
use liftlog::photos::decode_photo;
use liftlog::program::{PROGRAM, ProgramDay, SetScheme, day_for_weekday, program_day};
use liftlog::Tracker;

#[derive(Parser, Debug)]
#[command(version, about = "Liftlog - 4-day training and recomp tracker", long_about = None)]
struct Args {
    /// SQLite file; overrides DATABASE_URL
    #[arg(long, global = true)]
    database: Option<String>,
    /// off, error, warn, info, debug or trace; overrides LIFTLOG_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Needed when TRACKER_PASSCODE is set
    #[arg(long, global = true)]
    passcode: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tabbed terminal UI
    Interactive,
    /// Show the training program
    Program {
        #[arg(short, long)]
        day: Option<String>,
    },
    /// Log one exercise entry
    Log(LogArgs),
    /// Entries logged on a date
    Today {
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Body metrics
    Metric {
        #[command(subcommand)]
        command: MetricCommands,
    },
    /// Progress photos
    Photo {
        #[command(subcommand)]
        command: PhotoCommands,
    },
    /// Nutrition targets and TDEE
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Targets, trends and weekly volume
    Dashboard {
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
    },
    /// Write workouts.csv, body_metrics.csv and photos_meta.csv
    Export {
        #[arg(short, long, default_value = "export")]
        dir: PathBuf,
    },
    /// Append workouts from a CSV file
    Import { file: PathBuf },
}

#[derive(ClapArgs, Debug)]
struct LogArgs {
    /// Program day; defaults to the day trained on the session date
    #[arg(long)]
    day: Option<String>,
    #[arg(short, long)]
    exercise: String,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(short, long)]
    sets: Option<i32>,
    #[arg(short, long)]
    reps: Option<i32>,
    #[arg(short, long)]
    weight: Option<f64>,
    #[arg(long)]
    rir: Option<f64>,
    #[arg(short, long)]
    notes: Option<String>,
}

#[derive(Subcommand, Debug)]
enum MetricCommands {
    Add {
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        weight_kg: f64,
        #[arg(long)]
        waist_cm: f64,
        #[arg(long, default_value_t = limits::SLEEP.default)]
        sleep_h: f64,
        #[arg(long, default_value_t = limits::STEPS.default as i32)]
        steps: i32,
        #[arg(long, default_value_t = limits::INTAKE.default as i32)]
        calories: i32,
    },
    History {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PhotoCommands {
    Add {
        file: PathBuf,
        #[arg(short, long)]
        date: Option<NaiveDate>,
        #[arg(short, long, default_value = "")]
        caption: String,
    },
    List,
    /// Write a stored photo out as JPEG
    Save { id: i32, output: PathBuf },
}

#[derive(Subcommand, Debug)]
enum SettingsCommands {
    Show {
        #[arg(long)]
        json: bool,
    },
    Set(SettingsArgs),
}

#[derive(ClapArgs, Debug, Default)]
struct SettingsArgs {
    #[arg(long)]
    calories: Option<i32>,
    #[arg(long)]
    protein_g: Option<i32>,
    #[arg(long)]
    fat_g: Option<i32>,
    #[arg(long)]
    carb_g_rest: Option<i32>,
    #[arg(long)]
    carb_g_lift: Option<i32>,
    #[arg(long)]
    carb_g_football: Option<i32>,
    #[arg(long)]
    tdee: Option<i32>,
}

impl SettingsArgs {
    fn merge(&self, current: Settings) -> Result<Settings> {
        let merged = Settings {
            calories: self.calories.unwrap_or(current.calories),
            protein_g: self.protein_g.unwrap_or(current.protein_g),
            fat_g: self.fat_g.unwrap_or(current.fat_g),
            carb_g_rest: self.carb_g_rest.unwrap_or(current.carb_g_rest),
            carb_g_lift: self.carb_g_lift.unwrap_or(current.carb_g_lift),
            carb_g_football: self.carb_g_football.unwrap_or(current.carb_g_football),
            tdee: self.tdee.unwrap_or(current.tdee),
            ..current
        };
        limits::check_settings(&merged)?;
        Ok(merged)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn describe_scheme(scheme: &SetScheme) -> String {
    let reps = if scheme.reps_low == scheme.reps_high {
        scheme.reps_low.to_string()
    } else {
        format!("{}-{}", scheme.reps_low, scheme.reps_high)
    };
    let unit = if scheme.timed { "s holds" } else { "reps" };
    let side = if scheme.per_side { " per side" } else { "" };
    format!("{} sets of {} {}{}", scheme.sets, reps, unit, side)
}

fn print_day(day: &ProgramDay) -> Result<()> {
    println!("{} ({})", day.name, day.weekday);
    for exercise in day.exercises {
        let scheme = SetScheme::parse(exercise.scheme)?;
        let notes = if exercise.notes.is_empty() {
            String::new()
        } else {
            format!(" [{}]", exercise.notes)
        };
        println!(
            "\t{:<32} {:<14} {}{}",
            exercise.name,
            exercise.scheme,
            describe_scheme(&scheme),
            notes
        );
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Sessions for one-shot commands. The passcode comes from `--passcode`.
fn authenticate(tracker: &Tracker, passcode: Option<&str>) -> Result<AuthSession> {
    if let Some(auth) = tracker.gate().open_session() {
        return Ok(auth);
    }
    match passcode {
        Some(code) => Ok(tracker.gate().unlock(code)?),
        None => bail!("This tracker is locked; pass --passcode"),
    }
}

fn log_entry(args: LogArgs) -> Result<NewWorkoutEntry> {
    let session_date = args.date.unwrap_or_else(today);
    let day = match args.day {
        Some(name) => program_day(&name)?,
        None => match day_for_weekday(session_date.weekday()) {
            Some(day) => day,
            None => bail!("{} is not a lifting day; pass --day", session_date),
        },
    };
    if day.exercise(&args.exercise).is_none() {
        warn!("{} is not part of {}", args.exercise, day.name);
    }

    let entry = NewWorkoutEntry {
        session_date,
        day_name: day.name.to_string(),
        exercise: args.exercise,
        sets: args.sets,
        reps: args.reps,
        weight: args.weight,
        rir: args.rir,
        notes: args.notes.filter(|n| !n.is_empty()),
    };
    limits::check_workout(&entry)?;
    Ok(entry)
}

fn run(command: Commands, tracker: &Tracker, auth: &AuthSession) -> Result<()> {
    match command {
        Commands::Interactive => bail!("the terminal UI is started from main"),
        Commands::Program { day } => {
            match day {
                Some(name) => print_day(program_day(&name)?)?,
                None => {
                    for day in PROGRAM {
                        print_day(day)?;
                        println!();
                    }
                }
            }
            Ok(())
        }
        Commands::Log(args) => {
            let entry = log_entry(args)?;
            let saved = tracker.log_workout(auth, std::slice::from_ref(&entry))?;
            for row in saved {
                println!("Saved #{} {}", row.id, row);
            }
            Ok(())
        }
        Commands::Today { date, json } => {
            let date = date.unwrap_or_else(today);
            let entries = tracker.todays_log(auth, date)?;
            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("Nothing logged on {}", date);
            }
            for entry in entries {
                println!("{}, {}, {}", entry.id, entry.day_name, entry);
            }
            Ok(())
        }
        Commands::Metric { command } => match command {
            MetricCommands::Add {
                date,
                weight_kg,
                waist_cm,
                sleep_h,
                steps,
                calories,
            } => {
                let metric = NewBodyMetric {
                    metric_date: date.unwrap_or_else(today),
                    weight_kg,
                    waist_cm,
                    sleep_h,
                    steps,
                    calories,
                };
                limits::check_body_metric(&metric)?;
                let saved = tracker.record_body_metric(auth, &metric)?;
                println!("Saved metrics for {}", saved.metric_date);
                Ok(())
            }
            MetricCommands::History { json } => {
                let history = tracker.body_metric_history(auth)?;
                if json {
                    return print_json(&history);
                }
                println!("metric_date, weight_kg, waist_cm, sleep_h, steps, calories");
                for m in history {
                    println!(
                        "{}, {:.1}, {:.1}, {:.1}, {}, {}",
                        m.metric_date, m.weight_kg, m.waist_cm, m.sleep_h, m.steps, m.calories
                    );
                }
                Ok(())
            }
        },
        Commands::Photo { command } => match command {
            PhotoCommands::Add {
                file,
                date,
                caption,
            } => {
                let bytes = tui::read_image(&file)?;
                let photo =
                    tracker.upload_photo(auth, date.unwrap_or_else(today), &caption, &bytes)?;
                println!("Uploaded #{} {}", photo.id, photo);
                Ok(())
            }
            PhotoCommands::List => {
                let gallery = tracker.gallery(auth)?;
                if gallery.is_empty() {
                    println!("No photos yet.");
                }
                for item in gallery {
                    println!(
                        "{}, {} - {}, {}x{}, {} bytes",
                        item.id, item.photo_date, item.caption, item.width, item.height, item.bytes
                    );
                }
                Ok(())
            }
            PhotoCommands::Save { id, output } => {
                let Some(photo) = tracker.photo(auth, id)? else {
                    bail!("No photo with id {}", id);
                };
                fs::write(&output, decode_photo(&photo.image_b64)?)
                    .with_context(|| format!("writing {}", output.display()))?;
                println!("Saved {} to {}", photo, output.display());
                Ok(())
            }
        },
        Commands::Settings { command } => match command {
            SettingsCommands::Show { json } => {
                let settings = tracker.settings(auth)?;
                if json {
                    return print_json(&settings);
                }
                println!("Cut Calories:          {}", settings.calories);
                println!("Protein (g):           {}", settings.protein_g);
                println!("Fat (g):               {}", settings.fat_g);
                println!("Carbs Rest (g):        {}", settings.carb_g_rest);
                println!("Carbs Lift Day (g):    {}", settings.carb_g_lift);
                println!("Carbs Football Day (g): {}", settings.carb_g_football);
                println!("TDEE Estimate:         {}", settings.tdee);
                Ok(())
            }
            SettingsCommands::Set(args) => {
                let current = tracker.settings(auth)?;
                let saved = tracker.save_settings(auth, &args.merge(current)?)?;
                info!("Settings now {:?}", saved);
                println!("Saved.");
                Ok(())
            }
        },
        Commands::Dashboard { date, json } => {
            let dash = tracker.dashboard(auth, date.unwrap_or_else(today))?;
            if json {
                return print_json(&dash);
            }
            let s = &dash.settings;
            println!(
                "Targets: {} kcal, {} g protein, {} g fat, TDEE {}",
                s.calories, s.protein_g, s.fat_g, s.tdee
            );
            println!(
                "{} is a {}: {} g carbs",
                dash.today,
                dash.carb_day.label(),
                dash.carb_target_g
            );
            match (dash.body.weight_kg.last(), dash.body.waist_cm.last()) {
                (Some((day, kg)), Some((_, cm))) => {
                    println!("Latest body metrics ({}): {:.1} kg, {:.1} cm waist", day, kg, cm)
                }
                _ => println!("Add body metrics to see charts."),
            }
            if dash.workout_count == 0 {
                println!("Log workouts to see volume and e1RM charts.");
            } else {
                println!("Weekly volume:");
                for row in &dash.weekly_volume {
                    println!("\t{} {:<28} {:.0}", row.week_start, row.day_name, row.volume);
                }
                println!("Estimated 1RM:");
                for lift in &dash.e1rm {
                    if let Some((day, e1rm)) = lift.points.last() {
                        let slope = lift
                            .trend
                            .map(|t| format!(", trend {:+.2} kg/week", t.slope_per_day * 7.0))
                            .unwrap_or_default();
                        println!("\t{:<28} {:.1} kg on {}{}", lift.exercise, e1rm, day, slope);
                    }
                }
            }
            println!("Football:");
            for session in dash.football {
                println!("\t{}: ~{} min, {}", session.name, session.duration_min, session.kind);
            }
            Ok(())
        }
        Commands::Export { dir } => {
            for (path, rows) in tracker.export_all(auth, &dir)? {
                println!("Wrote {} ({} rows)", path.display(), rows);
            }
            Ok(())
        }
        Commands::Import { file } => {
            let reader =
                File::open(&file).with_context(|| format!("opening {}", file.display()))?;
            let imported = tracker.import_workouts_csv(auth, reader)?;
            println!("Imported {} rows.", imported);
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let mut config = Config::from_env();
    if let Some(database) = args.database {
        config.database_url = database;
    }
    if let Some(level) = args.log_level.as_deref() {
        match parse_level(level) {
            Some(level) => config.log_level = level,
            None => bail!("Unknown log level: {}", level),
        }
    }

    let interactive = matches!(args.command, Commands::Interactive);
    let sink = match (&config.log_file, interactive) {
        (Some(path), _) => LogSink::File(path.clone()),
        (None, true) => LogSink::Silent,
        (None, false) => LogSink::Stderr,
    };
    init_logger(config.log_level, sink)?;

    let tracker = Tracker::open(&config)?;

    if interactive {
        let terminal = ratatui::init();
        let result = tui::run(terminal, &tracker);
        ratatui::restore();
        return result;
    }

    let auth = authenticate(&tracker, args.passcode.as_deref())?;
    run(args.command, &tracker, &auth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use liftlog::TrackerError;
    use liftlog::auth::Gate;

    #[test]
    fn log_command_parses() {
        let args = Args::try_parse_from([
            "liftlog",
            "--database",
            "lifts.db",
            "log",
            "--exercise",
            "Incline DB Press",
            "--date",
            "2025-03-03",
            "-s",
            "4",
            "-r",
            "8",
            "-w",
            "25",
        ])
        .unwrap();
        assert_eq!(args.database.as_deref(), Some("lifts.db"));
        let Commands::Log(log) = args.command else {
            panic!("expected log command");
        };

        let entry = log_entry(log).unwrap();
        assert_eq!(entry.day_name, "Monday - Push");
        assert_eq!(entry.sets, Some(4));
        assert_eq!(entry.weight, Some(25.0));
        assert_eq!(entry.rir, None);
    }

    #[test]
    fn log_needs_a_day_off_schedule() {
        let args = Args::try_parse_from([
            "liftlog", "log", "-e", "Plank", "--date", "2025-03-05",
        ])
        .unwrap();
        let Commands::Log(log) = args.command else {
            panic!("expected log command");
        };
        assert!(log_entry(log).is_err());
    }

    #[test]
    fn log_rejects_out_of_range_reps() {
        let args = Args::try_parse_from([
            "liftlog",
            "log",
            "-e",
            "DB RDL",
            "--day",
            "Tuesday - Lower A (Squat)",
            "-r",
            "40",
        ])
        .unwrap();
        let Commands::Log(log) = args.command else {
            panic!("expected log command");
        };
        let err = log_entry(log).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackerError>(),
            Some(TrackerError::OutOfRange { field: "reps", .. })
        ));
    }

    #[test]
    fn bad_dates_are_rejected_by_clap() {
        assert!(Args::try_parse_from(["liftlog", "today", "--date", "03/03/2025"]).is_err());
    }

    #[test]
    fn settings_flags_merge_onto_current() {
        let args = SettingsArgs {
            tdee: Some(3100),
            carb_g_lift: Some(300),
            ..SettingsArgs::default()
        };
        let merged = args.merge(Settings::default()).unwrap();
        assert_eq!(merged.tdee, 3100);
        assert_eq!(merged.carb_g_lift, 300);
        assert_eq!(merged.calories, 2450);

        let too_low = SettingsArgs {
            protein_g: Some(50),
            ..SettingsArgs::default()
        };
        assert!(too_low.merge(Settings::default()).is_err());
    }

    #[test]
    fn schemes_read_naturally() {
        let plank = SetScheme::parse("2x20-30s/side").unwrap();
        assert_eq!(describe_scheme(&plank), "2 sets of 20-30 s holds per side");
        let rear = SetScheme::parse("3x15").unwrap();
        assert_eq!(describe_scheme(&rear), "3 sets of 15 reps");
    }

    #[test]
    fn locked_tracker_needs_passcode() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            database_url: dir.path().join("t.db").to_string_lossy().into_owned(),
            passcode: Some("1234".to_string()),
            ..Config::default()
        };
        let tracker = Tracker::open(&config).unwrap();
        assert!(authenticate(&tracker, None).is_err());
        assert!(authenticate(&tracker, Some("0000")).is_err());
        let auth = authenticate(&tracker, Some("1234")).unwrap();
        assert!(tracker.settings(&auth).is_ok());

        let open = Gate::new(None);
        assert!(open.open_session().is_some());
    }
}
