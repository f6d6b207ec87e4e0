//! Command parsing and output.

use anyhow::{bail, Result};

use quizkit_core::api::{LeaderboardQuery, ListQuery, SortOrder};
use quizkit_core::utils::{format_date, format_duration_ms, format_percent, truncate_string};
use quizkit_core::ApiClient;

/// Width of the title column in list output
const TITLE_WIDTH: usize = 40;

/// Categories with fewer answers are ignored when picking the strongest one
const MIN_CATEGORY_ANSWERS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quizzes { search: Option<String> },
    Quiz { id: String },
    Teams,
    Leaderboard { quiz_id: Option<String> },
    Stats,
    WhoAmI,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            bail!("Missing command");
        };
        let command = match name.as_str() {
            "quizzes" => Command::Quizzes {
                search: (!rest.is_empty()).then(|| rest.join(" ")),
            },
            "quiz" => match rest.first() {
                Some(id) => Command::Quiz { id: id.clone() },
                None => bail!("quiz: missing quiz id"),
            },
            "teams" => Command::Teams,
            "leaderboard" => Command::Leaderboard {
                quiz_id: rest.first().cloned(),
            },
            "stats" => Command::Stats,
            "whoami" => Command::WhoAmI,
            other => bail!("Unknown command: {}", other),
        };
        Ok(command)
    }
}

pub async fn run(client: &ApiClient, command: &Command) -> Result<()> {
    match command {
        Command::Quizzes { search } => {
            let mut query = ListQuery::new().sort_by("playCount", SortOrder::Desc);
            if let Some(term) = search {
                query = query.search(term);
            }
            let page = client.list_quizzes(&query).await?;
            if page.is_empty() {
                println!("No quizzes found.");
                return Ok(());
            }
            for quiz in &page.items {
                println!(
                    "{:<24} {:<width$} {:<6} {:>3}q {:>6} plays",
                    quiz.id,
                    truncate_string(&quiz.title, TITLE_WIDTH),
                    quiz.difficulty.to_string(),
                    quiz.question_count,
                    quiz.play_count,
                    width = TITLE_WIDTH
                );
            }
            println!("Page {} of {} ({} quizzes)", page.page, page.total_pages(), page.total);
        }
        Command::Quiz { id } => {
            let quiz = client.get_quiz(id).await?;
            println!("{} [{}]", quiz.title, quiz.difficulty);
            if let Some(ref description) = quiz.description {
                println!("{}", description);
            }
            println!(
                "{} questions, {} points, created {}",
                quiz.questions.len(),
                quiz.total_points(),
                format_date(quiz.created_at.as_ref())
            );
            for (i, question) in quiz.questions.iter().enumerate() {
                println!("\n{}. {} ({}s)", i + 1, question.text, question.time_limit_secs);
                for (j, option) in question.options.iter().enumerate() {
                    println!("   {}) {}", char::from(b'a' + (j as u8 % 26)), option);
                }
            }
        }
        Command::Teams => {
            let page = client.list_teams(&ListQuery::new()).await?;
            for team in &page.items {
                let captain = team.captain().map(|m| m.username.as_str()).unwrap_or("-");
                println!(
                    "{:<30} {:>10}  captain {:<16} {:>8} pts",
                    truncate_string(&team.name, 30),
                    team.display_member_count(),
                    captain,
                    team.total_score
                );
            }
        }
        Command::Leaderboard { quiz_id } => {
            let query = LeaderboardQuery {
                quiz_id: quiz_id.clone(),
                ..LeaderboardQuery::default()
            };
            let page = client.leaderboard(&query).await?;
            for entry in &page.items {
                println!(
                    "{:>4}. {:<20} {:>8} pts  {:>4} games  {}",
                    entry.rank,
                    entry.username,
                    entry.score,
                    entry.games_played,
                    entry.team_name.as_deref().unwrap_or("")
                );
            }
        }
        Command::Stats => {
            let stats = client.my_performance().await?;
            println!("Games played:  {}", stats.games_played);
            println!(
                "Accuracy:      {} ({}/{})",
                format_percent(stats.accuracy()),
                stats.correct_answers,
                stats.questions_answered
            );
            if let Some(ms) = stats.average_answer_ms {
                println!("Avg. answer:   {}", format_duration_ms(ms));
            }
            if let Some(rank) = stats.best_rank {
                println!("Best rank:     #{}", rank);
            }
            if let Some(best) = stats.strongest_category(MIN_CATEGORY_ANSWERS) {
                println!("Strongest:     {} ({})", best.category, format_percent(best.accuracy()));
            }
        }
        Command::WhoAmI => {
            let user = client.current_user().await?;
            println!("{} <{}>", user.username, user.email);
            println!("Role:          {:?}", user.role);
            println!("Member since:  {}", format_date(user.created_at.as_ref()));
            if let Some(session) = client.session() {
                println!("Session:       {} min", session.minutes_logged_in());
            }
        }
    }
    Ok(())
}
