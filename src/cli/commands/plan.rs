use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};

use ranno::capability::{AmenitySource, IncidentSource};
use ranno::config::PlannerConfig;
use ranno::db::CachedDataSource;
use ranno::dialogue::controller::Answer;
use ranno::dialogue::question::FollowUpQuestion;
use ranno::routing::RoutePlan;
use ranno::session::{GREETING, PlanningSession, SessionEvent};
use ranno::ui::{Style, info, warning};
use ranno::utils::formatting::{print_kv_block_colored_keys, truncate_ellipsis};

use crate::cli::color::Colors;
use crate::cli::export;

const OPTION_LABEL_WIDTH: usize = 60;

pub struct PlanOptions {
    pub prompt: Option<String>,
    pub cached: bool,
    pub json: bool,
    pub out: Option<PathBuf>,
    pub db_path: PathBuf,
}

pub async fn run(config: PlannerConfig, opts: PlanOptions) -> Result<()> {
    let data: Option<(Arc<dyn IncidentSource>, Arc<dyn AmenitySource>)> = opts.cached.then(|| {
        let cache = Arc::new(CachedDataSource::new(&opts.db_path));
        (
            cache.clone() as Arc<dyn IncidentSource>,
            cache as Arc<dyn AmenitySource>,
        )
    });
    let caps = ranno::providers::network_capabilities(&config, data)?;
    let mut session = PlanningSession::new(caps, config);

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let prompt = match opts.prompt {
        Some(p) => p,
        None => {
            println!("{GREETING}");
            read_line(&mut input, "> ")?.unwrap_or_default()
        }
    };

    session.load_data().await;
    for (name, err) in [
        ("incidents", &session.data().incidents.error),
        ("water fountains", &session.data().water.error),
        ("restrooms", &session.data().restrooms.error),
    ] {
        if let Some(e) = err {
            warning(format!("{name} unavailable: {e}"));
        }
    }

    let mut event = session.submit_prompt(&prompt).await;
    loop {
        match event {
            SessionEvent::Question(q) => {
                let answer = ask(&mut input, &q)?;
                event = session.answer(answer).await?;
            }
            SessionEvent::RouteReady(plan) => {
                print_plan(&plan, opts.json)?;
                if let Some(out) = &opts.out {
                    export::write_json(&plan, out)?;
                    info(format!("Plan written to {}", out.display()));
                }
                return Ok(());
            }
            SessionEvent::RouteFailed(msg) | SessionEvent::ParseFailed(msg) => {
                warning(msg);
                match next_prompt(&mut input)? {
                    Some(prompt) => event = session.submit_prompt(&prompt).await,
                    None => return Ok(()),
                }
            }
            SessionEvent::Stale => {
                warning("That plan was superseded.");
                match next_prompt(&mut input)? {
                    Some(prompt) => event = session.submit_prompt(&prompt).await,
                    None => return Ok(()),
                }
            }
        }
    }
}

/// Ask for another request after a failure. Blank lines are ignored, `None` on EOF.
fn next_prompt(input: &mut impl BufRead) -> Result<Option<String>> {
    loop {
        match read_line(input, "Try another request> ")? {
            None => return Ok(None),
            Some(line) if line.is_empty() => continue,
            Some(line) => return Ok(Some(line)),
        }
    }
}

fn read_line(input: &mut impl BufRead, prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim().to_string()))
}

fn ask(input: &mut impl BufRead, q: &FollowUpQuestion) -> Result<Answer> {
    let c = Colors::new(&Style::default());
    println!();
    println!("{}", c.info(&q.prompt));
    for (i, o) in q.options.iter().enumerate() {
        println!(
            "  {}) {}",
            i + 1,
            truncate_ellipsis(&o.label, OPTION_LABEL_WIDTH)
        );
    }
    if q.allow_skip {
        println!("  {}", c.dim("s) skip"));
    }

    loop {
        let Some(line) = read_line(input, "> ")? else {
            if q.allow_skip {
                return Ok(Answer::Skip);
            }
            bail!("input closed before \"{}\" was answered", q.prompt);
        };
        match parse_answer(&line, q) {
            Some(a) => return Ok(a),
            None => warning(format!(
                "Enter a number from 1 to {}{}",
                q.options.len(),
                if q.allow_skip { ", or s to skip" } else { "" }
            )),
        }
    }
}

/// `1`-based option index, or `s`/`skip`/empty when skipping is allowed.
pub fn parse_answer(line: &str, q: &FollowUpQuestion) -> Option<Answer> {
    let line = line.trim();
    let skip = line.is_empty() || line.eq_ignore_ascii_case("s") || line.eq_ignore_ascii_case("skip");
    if skip {
        return q.allow_skip.then_some(Answer::Skip);
    }
    let n: usize = line.parse().ok()?;
    let opt = q.options.get(n.checked_sub(1)?)?;
    Some(Answer::Choose(opt.id.clone()))
}

fn print_plan(plan: &RoutePlan, json: bool) -> Result<()> {
    if json {
        println!("{}", export::to_json(plan)?);
        return Ok(());
    }

    let c = Colors::new(&Style::default());
    let s = &plan.summary;
    let risk = &plan.route.risk_summary;

    println!();
    let mut pairs: Vec<(&str, String)> = vec![
        ("From", c.origin(&s.origin)),
        ("To", c.destination(&s.destination)),
        ("Distance", s.distance.clone()),
        ("Walking", s.walking_duration.clone()),
        ("Running", s.running_duration.clone()),
        ("Slope", s.slope.clone()),
        ("Safety", c.risk(risk.level, risk.estimated, &s.safety)),
    ];
    if !s.highlights.is_empty() {
        pairs.push(("Highlights", s.highlights.join("\n")));
    }
    if !s.water_stops.is_empty() {
        pairs.push(("Water", s.water_stops.join("\n")));
    }
    if !s.restroom_stops.is_empty() {
        pairs.push(("Restrooms", s.restroom_stops.join("\n")));
    }
    print_kv_block_colored_keys(&pairs, |k| c.dim(k));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranno::dialogue::question::{QuestionId, preference_question};

    #[test]
    fn answers_are_one_based() {
        let q = preference_question(QuestionId::RouteType).unwrap();
        assert_eq!(
            parse_answer("1", &q),
            Some(Answer::Choose(q.options[0].id.clone()))
        );
        assert_eq!(parse_answer("0", &q), None);
        assert_eq!(parse_answer("99", &q), None);
        assert_eq!(parse_answer("s", &q), Some(Answer::Skip));
        assert_eq!(parse_answer("", &q), Some(Answer::Skip));
    }

    #[test]
    fn failed_requests_can_be_retyped() {
        let mut input = io::Cursor::new("\n  \n5k loop from Crissy Field\n");
        assert_eq!(
            next_prompt(&mut input).unwrap().as_deref(),
            Some("5k loop from Crissy Field")
        );
        assert_eq!(next_prompt(&mut input).unwrap(), None);
    }
}
