use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use gym_core::equipment::{sorted_by_name, Equipment, EquipmentPatch, NewEquipment};
use gym_core::goals::DEFAULT_GOAL;
use gym_core::members::{member_overviews, NewMember, ProfileUpdate};
use gym_core::store::{load_occupancy, update_occupancy};
use gym_core::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ironcore")]
#[command(about = "IronCore gym tracker: workout recommendations, members and occupancy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend a workout plan for a goal and level
    Recommend {
        /// Use this member's goal and level as defaults
        #[arg(long)]
        member: Option<String>,

        /// Fitness goal (e.g. weight_loss, muscle_gain, endurance)
        #[arg(long)]
        goal: Option<String>,

        /// Difficulty level (beginner, intermediate, advanced)
        #[arg(long)]
        level: Option<DifficultyLevel>,

        /// Log the plan to the member's workout history
        #[arg(long, requires = "member")]
        save: bool,
    },

    /// Browse the exercise catalog
    Exercises {
        /// Only show one category
        #[arg(long)]
        category: Option<String>,

        /// Keyword matched against name, category and level
        #[arg(long)]
        search: Option<String>,
    },

    /// Manage members
    #[command(subcommand)]
    Member(MemberCommand),

    /// Members ranked by number of workouts
    Leaderboard,

    /// Membership statistics
    Stats,

    /// Gym occupancy
    #[command(subcommand)]
    Occupancy(OccupancyCommand),

    /// Manage equipment inventory
    #[command(subcommand)]
    Equipment(EquipmentCommand),
}

#[derive(Subcommand)]
enum MemberCommand {
    /// Register a new member
    Add {
        username: String,
        #[arg(long, default_value_t = 25)]
        age: u32,
        /// Weight in kg
        #[arg(long, default_value_t = 70.0)]
        weight: f64,
        /// Height in cm
        #[arg(long, default_value_t = 170.0)]
        height: f64,
        #[arg(long, default_value = DEFAULT_GOAL)]
        goal: String,
        #[arg(long, default_value = "beginner")]
        level: DifficultyLevel,
    },

    /// List members, most workouts first
    List,

    /// Show one member's profile
    Show { username: String },

    /// Update a member's profile
    Update {
        username: String,
        #[arg(long)]
        weight: Option<f64>,
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        level: Option<DifficultyLevel>,
    },

    /// Remove a member
    Remove { username: String },

    /// Show (or clear) a member's workout history
    History {
        username: String,
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum OccupancyCommand {
    /// Current count, crowding status and recent updates
    Show {
        /// Number of log entries to show
        #[arg(long)]
        recent: Option<usize>,
    },

    /// Set the current head count (clamped to 0..=50)
    Set {
        #[arg(allow_negative_numbers = true)]
        count: i64,
        #[arg(long, default_value = "manual update")]
        action: String,
    },
}

#[derive(Subcommand)]
enum EquipmentCommand {
    /// List equipment sorted by name
    List,

    /// Add an item
    Add {
        name: String,
        #[arg(long, default_value = "Other")]
        category: String,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
        #[arg(long, default_value = "Good")]
        condition: String,
        #[arg(long, default_value = "Operational")]
        status: String,
        /// Defaults to today
        #[arg(long)]
        last_service: Option<NaiveDate>,
        #[arg(long)]
        next_service: Option<NaiveDate>,
    },

    /// Update an item
    Update {
        id: u32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        quantity: Option<u32>,
        #[arg(long)]
        condition: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        last_service: Option<NaiveDate>,
        #[arg(long)]
        next_service: Option<NaiveDate>,
    },

    /// Remove an item
    Remove { id: u32 },
}

/// Files under the data directory
struct Paths {
    database: PathBuf,
    occupancy: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        Self {
            database: data_dir.join("gym_database.json"),
            occupancy: data_dir.join("occupancy.json"),
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging (stderr, quiet unless RUST_LOG says otherwise)
    gym_core::logging::init_with_level("warn");

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using data dir {:?}", data_dir);
    let paths = Paths::new(&data_dir);

    match cli.command {
        Commands::Recommend {
            member,
            goal,
            level,
            save,
        } => cmd_recommend(&paths, &config, member, goal, level, save, cli.json),
        Commands::Exercises { category, search } => {
            cmd_exercises(&config, category.as_deref(), search.as_deref(), cli.json)
        }
        Commands::Member(command) => cmd_member(&paths, command, cli.json),
        Commands::Leaderboard => cmd_leaderboard(&paths, cli.json),
        Commands::Stats => cmd_stats(&paths, cli.json),
        Commands::Occupancy(command) => cmd_occupancy(&paths, &config, command, cli.json),
        Commands::Equipment(command) => cmd_equipment(&paths, command, cli.json),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ============================================================================
// Recommendations
// ============================================================================

#[derive(Serialize)]
struct RecommendationOutput<'a> {
    goal: &'a str,
    level: DifficultyLevel,
    #[serde(flatten)]
    plan: &'a WorkoutPlan,
    saved: bool,
}

fn cmd_recommend(
    paths: &Paths,
    config: &Config,
    member: Option<String>,
    goal: Option<String>,
    level: Option<DifficultyLevel>,
    save: bool,
    json: bool,
) -> Result<()> {
    let index = config.build_index()?;
    let goals = config.goal_map();
    let engine = RecommendationEngine::new(&index, &goals);

    // Member profile supplies defaults for anything not given
    let profile = match &member {
        Some(username) => {
            let db = Database::load(&paths.database)?;
            let record = db.member(username)?;
            Some((record.goal.clone(), record.level))
        }
        None => None,
    };

    let goal = goal
        .or_else(|| profile.as_ref().map(|(g, _)| g.clone()))
        .unwrap_or_else(|| DEFAULT_GOAL.to_string());
    let level = level
        .or_else(|| profile.as_ref().map(|(_, l)| *l))
        .unwrap_or(DifficultyLevel::Beginner);

    let plan = engine.recommend(&goal, level);

    if save {
        if let Some(username) = &member {
            let record = WorkoutRecord::from_plan(&plan, &goal, level, today());
            Database::update(&paths.database, |db| db.record_workout(username, record))?;
        }
    }

    if json {
        return print_json(&RecommendationOutput {
            goal: &goal,
            level,
            plan: &plan,
            saved: save,
        });
    }

    display_plan(&goal, level, &plan);
    if save {
        println!("\n✓ Workout saved!");
    }
    Ok(())
}

fn display_plan(goal: &str, level: DifficultyLevel, plan: &WorkoutPlan) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  WORKOUT PLAN: {} ({})", goal, level);
    println!("╰─────────────────────────────────────────╯");
    println!();

    if plan.is_empty() {
        println!("  No exercises available for this goal and level.");
        return;
    }

    for exercise in &plan.exercises {
        println!(
            "  {:<26} {:<10} {} x {}  {:>4} kcal",
            exercise.name, exercise.category, exercise.sets, exercise.reps, exercise.calories
        );
    }
    println!();
    println!("  Total: {} kcal", plan.total_calories);
}

#[derive(Serialize)]
struct ExercisesOutput<'a> {
    exercises: Vec<ExerciseDefinition>,
    categories: Vec<&'a str>,
}

fn cmd_exercises(
    config: &Config,
    category: Option<&str>,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let index = config.build_index()?;
    let exercises = index.browse(category, search);

    if json {
        return print_json(&ExercisesOutput {
            exercises,
            categories: index.categories(),
        });
    }

    if exercises.is_empty() {
        println!("No exercises found.");
        return Ok(());
    }
    for e in &exercises {
        println!(
            "  {:<26} {:<10} {:<13} {} x {}  {:>4} kcal",
            e.name, e.category, e.level, e.sets, e.reps, e.calories
        );
    }
    println!("\nCategories: {}", index.categories().join(", "));
    Ok(())
}

// ============================================================================
// Members
// ============================================================================

fn cmd_member(paths: &Paths, command: MemberCommand, json: bool) -> Result<()> {
    match command {
        MemberCommand::Add {
            username,
            age,
            weight,
            height,
            goal,
            level,
        } => {
            let new_member = NewMember {
                username,
                age,
                weight,
                height,
                goal,
                level,
            };
            let record = Database::update(&paths.database, |db| {
                db.add_member(new_member, today()).cloned()
            })?;
            if json {
                return print_json(&members::MemberOverview::from(&record));
            }
            println!("✓ {} added!", record.username);
        }

        MemberCommand::List => {
            let db = Database::load(&paths.database)?;
            let rows = member_overviews(db.members());
            if json {
                return print_json(&rows);
            }
            if rows.is_empty() {
                println!("No members yet.");
            }
            for row in &rows {
                println!(
                    "  {:<16} {:>3} workouts  {:>6} kcal  BMI {:>4.1} ({})  {} / {}",
                    row.username,
                    row.workout_count,
                    row.total_calories,
                    row.bmi,
                    row.bmi_category,
                    row.goal,
                    row.level
                );
            }
            println!("\nTotal: {}", rows.len());
        }

        MemberCommand::Show { username } => {
            let db = Database::load(&paths.database)?;
            let row = members::MemberOverview::from(db.member(&username)?);
            if json {
                return print_json(&row);
            }
            display_member(&row);
        }

        MemberCommand::Update {
            username,
            weight,
            height,
            goal,
            level,
        } => {
            let update = ProfileUpdate {
                weight,
                height,
                goal,
                level,
            };
            let record = Database::update(&paths.database, |db| {
                db.update_profile(&username, &update).cloned()
            })?;
            let row = members::MemberOverview::from(&record);
            if json {
                return print_json(&row);
            }
            println!("✓ Profile updated");
            display_member(&row);
        }

        MemberCommand::Remove { username } => {
            Database::update(&paths.database, |db| db.remove_member(&username))?;
            println!("✓ {} removed", username);
        }

        MemberCommand::History { username, clear } => {
            if clear {
                let cleared =
                    Database::update(&paths.database, |db| db.clear_history(&username))?;
                println!("✓ Cleared {} workouts", cleared);
                return Ok(());
            }

            let db = Database::load(&paths.database)?;
            let history = &db.member(&username)?.history;
            if json {
                return print_json(history);
            }
            if history.is_empty() {
                println!("No workouts logged.");
            }
            for workout in history {
                println!(
                    "  {}  {:<16} {:<13} {:>4} kcal  ({} exercises)",
                    workout.date,
                    workout.goal,
                    workout.level,
                    workout.total_calories,
                    workout.exercises.len()
                );
            }
        }
    }
    Ok(())
}

fn display_member(row: &members::MemberOverview) {
    println!("  Username: {}", row.username);
    println!("  Age:      {}", row.age);
    println!("  Weight:   {} kg", row.weight);
    println!("  Height:   {} cm", row.height);
    println!("  BMI:      {} ({})", row.bmi, row.bmi_category);
    println!("  Goal:     {}", row.goal);
    println!("  Level:    {}", row.level);
    println!("  Joined:   {}", row.joined);
    println!("  Workouts: {} ({} kcal)", row.workout_count, row.total_calories);
}

// ============================================================================
// Reports
// ============================================================================

fn cmd_leaderboard(paths: &Paths, json: bool) -> Result<()> {
    let db = Database::load(&paths.database)?;
    let board = leaderboard(&db.summaries());

    if json {
        return print_json(&board);
    }
    for (rank, entry) in board.iter().enumerate() {
        println!("  {:>2}. {:<16} {} workouts", rank + 1, entry.username, entry.workout_count);
    }
    Ok(())
}

#[derive(Serialize)]
struct StatsOutput {
    #[serde(flatten)]
    report: DistributionReport,
    gym_count: u32,
}

fn cmd_stats(paths: &Paths, json: bool) -> Result<()> {
    let db = Database::load(&paths.database)?;
    let report = distribution(&db.summaries());
    let gym_count = load_occupancy(&paths.occupancy)?.current_count();

    if json {
        return print_json(&StatsOutput { report, gym_count });
    }

    println!("  Members:      {}", report.total_members);
    println!("  Workouts:     {}", report.total_workouts);
    println!("  Calories:     {}", report.total_calories);
    println!("  Most active:  {}", report.most_active_username);
    println!("  In gym now:   {}", gym_count);
    println!("\n  Goals:");
    for (goal, count) in report.goal_distribution.iter() {
        println!("    {:<16} {}", goal, count);
    }
    println!("\n  Levels:");
    for (level, count) in report.level_distribution.iter() {
        println!("    {:<16} {}", level, count);
    }
    Ok(())
}

// ============================================================================
// Occupancy
// ============================================================================

fn cmd_occupancy(paths: &Paths, config: &Config, command: OccupancyCommand, json: bool) -> Result<()> {
    match command {
        OccupancyCommand::Show { recent } => {
            let tracker = load_occupancy(&paths.occupancy)?;
            let snapshot = tracker.snapshot(recent.unwrap_or(config.occupancy.recent_log_len));
            if json {
                return print_json(&snapshot);
            }
            display_occupancy(&snapshot);
        }

        OccupancyCommand::Set { count, action } => {
            let state = update_occupancy(&paths.occupancy, |tracker| {
                tracker.record_event(count, action, Utc::now())
            })?;
            if json {
                return print_json(&state);
            }
            println!(
                "✓ Gym count set to {} ({})",
                state.current_count,
                occupancy_status(state.current_count)
            );
        }
    }
    Ok(())
}

fn display_occupancy(snapshot: &OccupancySnapshot) {
    println!(
        "  {}/{} people ({}%) - {}",
        snapshot.count, snapshot.max_capacity, snapshot.percentage, snapshot.status
    );
    if !snapshot.recent_log.is_empty() {
        println!("\n  Recent updates:");
        for event in &snapshot.recent_log {
            println!(
                "    {}  {:>2}  {}",
                event.timestamp.format("%Y-%m-%d %H:%M"),
                event.count,
                event.action
            );
        }
    }
}

// ============================================================================
// Equipment
// ============================================================================

fn cmd_equipment(paths: &Paths, command: EquipmentCommand, json: bool) -> Result<()> {
    match command {
        EquipmentCommand::List => {
            let db = Database::load(&paths.database)?;
            let items = sorted_by_name(&db.equipment());
            if json {
                return print_json(&items);
            }
            for item in &items {
                display_equipment(item);
            }
        }

        EquipmentCommand::Add {
            name,
            category,
            quantity,
            condition,
            status,
            last_service,
            next_service,
        } => {
            let item = NewEquipment {
                name,
                category,
                quantity,
                condition,
                status,
                last_service: last_service.or_else(|| Some(today())),
                next_service,
            };
            let added = Database::update(&paths.database, |db| db.add_equipment(item))?;
            if json {
                return print_json(&added);
            }
            println!("✓ {} added!", added.name);
        }

        EquipmentCommand::Update {
            id,
            name,
            category,
            quantity,
            condition,
            status,
            last_service,
            next_service,
        } => {
            let patch = EquipmentPatch {
                name,
                category,
                quantity,
                condition,
                status,
                last_service,
                next_service,
            };
            let updated = Database::update(&paths.database, |db| db.update_equipment(id, &patch))?;
            if json {
                return print_json(&updated);
            }
            println!("✓ Equipment updated!");
            display_equipment(&updated);
        }

        EquipmentCommand::Remove { id } => {
            let removed = Database::update(&paths.database, |db| db.remove_equipment(id))?;
            println!("✓ {} removed", removed.name);
        }
    }
    Ok(())
}

fn display_equipment(item: &Equipment) {
    let service = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
    println!(
        "  #{:<3} {:<18} {:<14} x{:<3} {:<10} {:<13} serviced {} / next {}",
        item.id,
        item.name,
        item.category,
        item.quantity,
        item.condition,
        item.status,
        service(item.last_service),
        service(item.next_service)
    );
}
