use crate::infra::{build_orchestrator, parse_text_type, read_essay};
use clap::Args;
use essay_coach::config::{AppConfig, RealtimeConfig};
use essay_coach::error::AppError;
use essay_coach::essay::{Essay, TextType};
use essay_coach::realtime::{
    score_text, HeuristicScorers, RealtimeScore, RealtimeScoreSnapshot, RealtimeScoringSession,
    RealtimeUpdate, ScoreDirection,
};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

const SAMPLE_ESSAY: &str = "Leo opened the ancient door. Suddenly, a cold wind rushed past him. \
He whispered, \"Who's there?\" Nobody answered, but a faint light flickered at the end of the hall.

However, Leo was determined to discover the truth. He crept forward, his heart pounding like a drum. \
The light grew brighter and warmer with every careful step.

Finally, he reached a small room filled with glowing lanterns. His grandmother smiled at him from \
an old armchair. \"You found my secret workshop,\" she said. Leo laughed with relief, and together \
they lit one more lantern.";

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Plain-text essay to score
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Writing genre (narrative, persuasive, expository, ...)
    #[arg(long, default_value = "narrative", value_parser = parse_text_type)]
    pub(crate) text_type: TextType,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Plain-text essay to evaluate
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Writing genre (narrative, persuasive, expository, ...)
    #[arg(long, default_value = "narrative", value_parser = parse_text_type)]
    pub(crate) text_type: TextType,
    /// Prompt the student was responding to
    #[arg(long, default_value = "")]
    pub(crate) prompt: String,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Writing genre used for the sample essay
    #[arg(long, default_value = "narrative", value_parser = parse_text_type)]
    pub(crate) text_type: TextType,
    /// Debounce window in milliseconds (500-1000)
    #[arg(long, default_value_t = RealtimeConfig::MAX_DEBOUNCE_MS)]
    pub(crate) debounce_ms: u64,
    /// Delay between simulated keystrokes, in milliseconds
    #[arg(long, default_value_t = 60)]
    pub(crate) keystroke_ms: u64,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let text = read_essay(&args.file)?;
    let score = score_text(&HeuristicScorers::default(), &text, args.text_type);
    print!("{}", render_score(&score));
    Ok(())
}

pub(crate) async fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let text = read_essay(&args.file)?;
    let essay = Essay::new(text, args.text_type, args.prompt);

    let orchestrator = build_orchestrator(&config)?;
    let outcome = orchestrator.evaluate(&essay).await?;

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &outcome).map_err(std::io::Error::from)?;
    writeln!(stdout)?;
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = RealtimeConfig::new(args.debounce_ms)?;
    let (session, mut updates) = RealtimeScoringSession::from_config(&config);
    let keystroke = Duration::from_millis(args.keystroke_ms);
    let pause = config.debounce() + Duration::from_millis(150);

    println!(
        "Realtime scoring demo ({} debounce, {} writing)",
        format_millis(config.debounce()),
        args.text_type
    );

    let mut typed = String::new();
    for (index, sentence) in sentence_chunks(SAMPLE_ESSAY).into_iter().enumerate() {
        for word in sentence.split_inclusive(char::is_whitespace) {
            typed.push_str(word);
            session.text_changed(typed.clone(), args.text_type);
            tokio::time::sleep(keystroke).await;
        }

        // Pausing longer than the window lets the pending evaluation run.
        tokio::time::sleep(pause).await;
        while let Ok(update) = updates.try_recv() {
            print!("{}", render_update(index + 1, &update));
        }
    }

    println!(
        "\n{} evaluations for {} words typed",
        session.evaluations(),
        typed.split_whitespace().count()
    );
    Ok(())
}

/// Split text after sentence-ending punctuation, keeping trailing whitespace
/// with the sentence it follows.
fn sentence_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((index, ch)) = chars.next() {
        let closes = matches!(ch, '.' | '!' | '?')
            && chars
                .peek()
                .map_or(true, |(_, next)| next.is_whitespace());
        if closes {
            let mut end = index + ch.len_utf8();
            while let Some((next_index, next)) = chars.peek().copied() {
                if !next.is_whitespace() {
                    break;
                }
                end = next_index + next.len_utf8();
                chars.next();
            }
            chunks.push(&text[start..end]);
            start = end;
        }
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }
    chunks
}

fn format_millis(duration: Duration) -> String {
    format!("{}ms", duration.as_millis())
}

pub(crate) fn render_score(score: &RealtimeScore) -> String {
    match score.snapshot() {
        Some(snapshot) => render_snapshot(snapshot),
        None => "No score yet: start writing to see an estimate.\n".to_string(),
    }
}

fn render_snapshot(snapshot: &RealtimeScoreSnapshot) -> String {
    let mut out = format!(
        "Realtime estimate: {}/30 ({}%) from {} words\n",
        snapshot.total_out_of_30, snapshot.percentage, snapshot.word_count
    );
    for line in &snapshot.breakdown {
        out.push_str(&format!(
            "- {}: level {}/4 -> {}/{} ({}% weighting)\n",
            line.label, line.level, line.score, line.out_of, line.weight_percent
        ));
        for note in &line.notes {
            out.push_str(&format!("    * {note}\n"));
        }
    }
    out
}

fn render_update(sentence: usize, update: &RealtimeUpdate) -> String {
    let Some(snapshot) = update.score.snapshot() else {
        return format!("[sentence {sentence}] no score\n");
    };

    let mut out = format!(
        "[sentence {sentence}] {} words -> {}/30\n",
        snapshot.word_count, snapshot.total_out_of_30
    );
    for change in &update.changes {
        let arrow = match change.direction {
            ScoreDirection::Up => "up",
            ScoreDirection::Down => "down",
        };
        out.push_str(&format!(
            "    {} {arrow}: {} -> {}\n",
            change.criterion.label(),
            change.old_score,
            change.new_score
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentence_chunks_cover_the_whole_text() {
        let chunks = sentence_chunks(SAMPLE_ESSAY);
        assert_eq!(chunks.concat(), SAMPLE_ESSAY);
        assert!(chunks[0].starts_with("Leo opened the ancient door."));
        assert!(chunks.len() > 5);
    }

    #[test]
    fn sentence_chunks_keep_unterminated_tails() {
        assert_eq!(
            sentence_chunks("One. Two and three"),
            vec!["One. ", "Two and three"]
        );
    }

    #[test]
    fn renders_breakdown_for_scored_text() {
        let score = score_text(&HeuristicScorers::default(), SAMPLE_ESSAY, TextType::Narrative);
        let rendered = render_score(&score);
        assert!(rendered.starts_with("Realtime estimate:"));
        assert!(rendered.contains("Ideas & Content: level"));
        assert!(rendered.contains("Grammar & Mechanics: level"));
    }

    #[test]
    fn renders_placeholder_for_blank_text() {
        let rendered = render_score(&RealtimeScore::NoScore);
        assert!(rendered.starts_with("No score yet"));
    }

    #[tokio::test(start_paused = true)]
    async fn demo_replays_the_sample_essay() {
        let args = DemoArgs {
            text_type: TextType::Narrative,
            debounce_ms: 500,
            keystroke_ms: 10,
        };
        run_demo(args).await.expect("demo completes");
    }

    #[tokio::test]
    async fn demo_rejects_out_of_range_windows() {
        let args = DemoArgs {
            text_type: TextType::Narrative,
            debounce_ms: 50,
            keystroke_ms: 10,
        };
        let err = run_demo(args).await.expect_err("window rejected");
        assert!(matches!(err, AppError::Config(_)));
    }
}
