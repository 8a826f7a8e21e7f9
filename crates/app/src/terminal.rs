//! Line-oriented take-quiz screen.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use log::{debug, info};
use quiz_core::model::QuizDocument;
use quiz_core::{GradeReport, QuizSession, ScoreBand, SessionPhase, SuspendedSession};

/// One line of learner input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TakeCommand {
    Next,
    Previous,
    /// 1-based question number as typed.
    GoTo(usize),
    /// Option letter or the option text itself.
    Answer(String),
    Submit,
    Retake,
    Quit,
    Help,
}

impl FromStr for TakeCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        match (head.to_ascii_lowercase().as_str(), rest) {
            ("n" | "next", "") => Ok(Self::Next),
            ("p" | "prev" | "previous", "") => Ok(Self::Previous),
            ("g" | "go", n) => n
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .map(Self::GoTo)
                .ok_or_else(|| format!("not a question number: {n:?}")),
            ("a" | "answer", "") => Err("answer needs an option letter or text".into()),
            ("a" | "answer", choice) => Ok(Self::Answer(choice.to_owned())),
            ("s" | "submit", "") => Ok(Self::Submit),
            ("r" | "retake", "") => Ok(Self::Retake),
            ("q" | "quit" | "exit", "") => Ok(Self::Quit),
            ("h" | "help" | "?", "") => Ok(Self::Help),
            _ => Err(format!("unknown command: {line:?}")),
        }
    }
}

fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map_or('?', |i| char::from(b'A' + i))
}

/// Map a single letter to an option index, if it names one of `count` options.
fn letter_index(choice: &str, count: usize) -> Option<usize> {
    let mut chars = choice.chars();
    let c = chars.next()?;
    if chars.next().is_some() || !c.is_ascii_alphabetic() {
        return None;
    }
    let index = usize::from(c.to_ascii_uppercase() as u8 - b'A');
    (index < count).then_some(index)
}

/// Option text typed in full wins over a letter of the same spelling.
fn select(session: &mut QuizSession, choice: &str) -> bool {
    let question = session.current_question();
    let id = question.id();
    if question.has_option(choice) {
        return session.select_answer(id, choice);
    }
    match letter_index(choice, question.options().len()) {
        Some(index) => session.select_option_at(index),
        None => false,
    }
}

pub fn print_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Commands:")?;
    writeln!(out, "  n / p        next / previous question")?;
    writeln!(out, "  g <number>   jump to a question")?;
    writeln!(out, "  a <letter>   choose an option (or type its text)")?;
    writeln!(out, "  s            submit once every question is answered")?;
    writeln!(out, "  r            retake after submitting")?;
    writeln!(out, "  q            leave take mode")
}

pub fn print_overview(out: &mut impl Write, quiz: &QuizDocument) -> io::Result<()> {
    writeln!(out, "{}", quiz.title())?;
    writeln!(out, "{}", quiz.url())?;
    writeln!(out)?;
    writeln!(out, "{}", quiz.summary())?;
    let entities = quiz.key_entities();
    for (label, names) in [
        ("People", &entities.people),
        ("Organizations", &entities.organizations),
        ("Locations", &entities.locations),
    ] {
        if !names.is_empty() {
            writeln!(out, "{label}: {}", names.join(", "))?;
        }
    }
    if !quiz.sections().is_empty() {
        writeln!(out, "Sections: {}", quiz.sections().join(" | "))?;
    }
    for group in quiz.questions_by_section() {
        writeln!(out)?;
        writeln!(out, "[{}]", group.name)?;
        for ordinal in group.ordinals {
            if let Some(q) = quiz.question(ordinal) {
                writeln!(out, "  {}. {} ({})", ordinal + 1, q.prompt(), q.difficulty())?;
            }
        }
    }
    if !quiz.related_topics().is_empty() {
        writeln!(out)?;
        writeln!(out, "Related: {}", quiz.related_topics().join(", "))?;
    }
    Ok(())
}

fn print_question(out: &mut impl Write, session: &QuizSession) -> io::Result<()> {
    let total = session.document().question_count();
    let q = session.current_question();
    writeln!(out)?;
    writeln!(
        out,
        "Question {} of {}    Answered: {} / {}",
        session.current_index() + 1,
        total,
        session.answered_count(),
        total
    )?;
    match q.section_reference() {
        Some(section) => writeln!(out, "[{}] [{section}]", q.difficulty().as_str().to_uppercase())?,
        None => writeln!(out, "[{}]", q.difficulty().as_str().to_uppercase())?,
    }
    writeln!(out, "{}", q.prompt())?;
    let selected = session.selection(q.id());
    for (i, option) in q.options().iter().enumerate() {
        let marker = if selected == Some(option.as_str()) { '*' } else { ' ' };
        writeln!(out, " {marker} {}) {option}", option_letter(i))?;
    }
    Ok(())
}

fn band_label(band: ScoreBand) -> &'static str {
    match band {
        ScoreBand::High => "great",
        ScoreBand::Medium => "good",
        ScoreBand::Low => "keep practicing",
    }
}

fn print_results(out: &mut impl Write, session: &QuizSession, report: &GradeReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Quiz completed: {}% ({})", report.percentage(), band_label(report.band()))?;
    writeln!(
        out,
        "You got {} out of {} questions correct",
        report.correct(),
        report.total()
    )?;
    for row in session.review().unwrap_or_default() {
        let q = row.question;
        let mark = if row.is_correct { "ok " } else { "bad" };
        writeln!(out)?;
        writeln!(out, "{mark} {}. {}", q.ordinal() + 1, q.prompt())?;
        writeln!(out, "    Your answer: {}", row.selected.unwrap_or("-"))?;
        if !row.is_correct {
            writeln!(out, "    Correct answer: {}", q.answer())?;
        }
        writeln!(out, "    {}", q.explanation())?;
    }
    Ok(())
}

/// Run take mode until the learner quits or input ends.
///
/// The session is handed back suspended so its answers survive.
pub fn run_take<R: BufRead, W: Write>(
    mut session: QuizSession,
    input: R,
    mut out: W,
) -> io::Result<SuspendedSession> {
    print_help(&mut out)?;
    print_question(&mut out, &session)?;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<TakeCommand>() {
            Ok(command) => command,
            Err(msg) => {
                writeln!(out, "{msg} (h for help)")?;
                continue;
            }
        };
        debug!("take command {command:?}");
        match command {
            TakeCommand::Next => {
                session.next();
            }
            TakeCommand::Previous => {
                session.previous();
            }
            TakeCommand::GoTo(number) => {
                session.go_to(number - 1);
            }
            TakeCommand::Answer(choice) => {
                if session.phase() == SessionPhase::Reviewing {
                    writeln!(out, "Already submitted; r to retake.")?;
                } else if !select(&mut session, &choice) {
                    writeln!(out, "No option {choice:?} on this question.")?;
                }
            }
            TakeCommand::Submit => {
                let total = session.document().question_count();
                let answered = session.answered_count();
                match session.submit().cloned() {
                    Some(report) => {
                        info!("submitted: {}/{} correct", report.correct(), report.total());
                        print_results(&mut out, &session, &report)?;
                        continue;
                    }
                    None => writeln!(out, "Answer all questions first ({answered} / {total}).")?,
                }
            }
            TakeCommand::Retake => {
                if session.retake() {
                    info!("retaking quiz {:?}", session.document().id());
                } else {
                    writeln!(out, "Nothing to retake yet.")?;
                }
            }
            TakeCommand::Quit => break,
            TakeCommand::Help => {
                print_help(&mut out)?;
                continue;
            }
        }
        print_question(&mut out, &session)?;
    }
    out.flush()?;
    Ok(session.exit())
}
