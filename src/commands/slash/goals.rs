//! Goal slash commands: /add_goal, /view_goals, /complete_goal, /progress, /streak, /clear_completed

use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::CommandOptionType;

/// Longest goal description accepted by /add_goal
pub const MAX_TASK_LENGTH: usize = 200;

/// Upper bound on /add_goal durations (one week)
pub const MAX_DURATION_MINUTES: i64 = 7 * 24 * 60;

/// Creates goal commands
pub fn create_commands() -> Vec<CreateApplicationCommand> {
    vec![
        create_add_goal_command(),
        simple_command("view_goals", "View current goals."),
        create_complete_goal_command(),
        simple_command("progress", "View your goal progress."),
        simple_command("streak", "View your current streak of completing goals."),
        simple_command("clear_completed", "Clear all completed goals."),
    ]
}

fn simple_command(name: &str, description: &str) -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name(name)
        .description(description)
        .to_owned()
}

fn create_add_goal_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("add_goal")
        .description("Add a new goal with a duration in minutes.")
        .create_option(|option| {
            option
                .name("duration")
                .description("Duration of the task in minutes")
                .kind(CommandOptionType::Integer)
                .required(true)
        })
        .create_option(|option| {
            option
                .name("task")
                .description("Description of the task")
                .kind(CommandOptionType::String)
                .required(true)
        })
        .to_owned()
}

fn create_complete_goal_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("complete_goal")
        .description("Mark a goal as completed by its number.")
        .create_option(|option| {
            option
                .name("task_number")
                .description("The number of the task to mark as completed.")
                .kind(CommandOptionType::Integer)
                .required(true)
        })
        .to_owned()
}
