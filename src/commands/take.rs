use serde_json::Value;

use crate::gateway::{HttpGateway, PublicGateway};
use crate::render::helpers::format_clock;
use crate::response::{CollectorError, ResponseCollector};
use crate::survey::{AnswerValue, QuestionType, SurveyQuestion};

use super::CommandError;

const MAX_ROUNDS: usize = 3;

/// Reads one typed answer. Choice questions accept option numbers (1-based)
/// or the option text; checkbox answers are comma-separated.
pub fn parse_answer(question: &SurveyQuestion, input: &str) -> Option<AnswerValue> {
    let input = input.trim();
    let options = &question.question.options;
    let pick = |token: &str| -> Option<String> {
        let token = token.trim();
        token
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i).cloned())
            .or_else(|| options.iter().find(|o| o.as_str() == token).cloned())
    };
    match question.question.question_type {
        QuestionType::Text | QuestionType::Textarea => Some(AnswerValue::text(input)),
        QuestionType::Rating => input.parse::<u8>().ok().map(AnswerValue::Rating),
        QuestionType::Radio => pick(input).map(AnswerValue::Text),
        QuestionType::Checkbox => Some(AnswerValue::Selection(
            input
                .split(',')
                .filter(|t| !t.trim().is_empty())
                .filter_map(pick)
                .collect(),
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeSummary {
    pub title: String,
    pub answered: usize,
    pub total: usize,
    pub elapsed: String,
}

/// Walks a respondent through the survey behind `unique_link`. `ask` is
/// called per question and returns the raw input, or `None` to skip. After a
/// rejected submission only the flagged questions are asked again.
pub async fn run<G, F>(gateway: &G, unique_link: &str, mut ask: F) -> Result<TakeSummary, CommandError>
where
    G: PublicGateway + ?Sized,
    F: FnMut(&SurveyQuestion, Option<&str>) -> Option<String>,
{
    let mut collector = ResponseCollector::new(unique_link);
    if let crate::response::CollectorState::Failed(message) = collector.state() {
        return Err(CommandError::Invalid(message.clone()));
    }
    collector.load(gateway).await?;
    let ticker = collector.start_ticker();

    let questions = match collector.survey() {
        Some(survey) => survey.questions.clone(),
        None => return Err(CollectorError::NotReady.into()),
    };
    let mut pending: Vec<&SurveyQuestion> = questions.iter().collect();

    for round in 0..MAX_ROUNDS {
        for &question in &pending {
            let issue = collector.issue_for(&question.id).map(|e| e.to_string());
            let Some(raw) = ask(question, issue.as_deref()) else {
                continue;
            };
            match question.question.question_type {
                QuestionType::Checkbox => {
                    let picked = match parse_answer(question, &raw) {
                        Some(AnswerValue::Selection(items)) => items,
                        _ => Vec::new(),
                    };
                    for option in &question.question.options {
                        collector.toggle_checkbox_option(&question.id, option, picked.contains(option))?;
                    }
                }
                _ => collector.set_answer(&question.id, parse_answer(question, &raw))?,
            }
        }
        match collector.submit(gateway).await {
            Ok(()) => break,
            Err(CollectorError::Invalid { .. }) if round + 1 < MAX_ROUNDS => {
                let flagged: Vec<&str> = collector.issues().iter().map(|i| i.question_id.as_str()).collect();
                pending = questions.iter().filter(|q| flagged.contains(&q.id.as_str())).collect();
            }
            Err(err) => {
                ticker.stop();
                return Err(err.into());
            }
        }
    }
    ticker.stop();

    let progress = collector.progress();
    Ok(TakeSummary {
        title: collector.survey().map(|s| s.title.clone()).unwrap_or_default(),
        answered: progress.answered,
        total: progress.total,
        elapsed: format_clock(collector.elapsed_secs()),
    })
}

pub async fn results(gateway: &HttpGateway, unique_link: &str) -> Result<Value, CommandError> {
    Ok(gateway.public_results(unique_link.trim()).await?)
}

#[cfg(test)]
mod tests {
    use super::{parse_answer, run};
    use crate::commands::testing::gateway;
    use crate::commands::CommandError;
    use crate::survey::{AnswerValue, SurveyQuestion};
    use mockito::Matcher;

    fn question(json: &str) -> SurveyQuestion {
        serde_json::from_str(json).expect("question")
    }

    #[test]
    fn parses_by_type() {
        let radio = question(r#"{"_id":"q","questionText":"?","questionType":"radio","options":["Так","Ні"]}"#);
        assert_eq!(parse_answer(&radio, "2"), Some(AnswerValue::text("Ні")));
        assert_eq!(parse_answer(&radio, "Так"), Some(AnswerValue::text("Так")));
        assert_eq!(parse_answer(&radio, "7"), None);

        let boxes = question(r#"{"_id":"q","questionText":"?","questionType":"checkbox","options":["A","B","C"]}"#);
        assert_eq!(
            parse_answer(&boxes, "3, 1"),
            Some(AnswerValue::Selection(vec!["C".to_string(), "A".to_string()]))
        );

        let rating = question(r#"{"_id":"q","questionText":"?","questionType":"rating"}"#);
        assert_eq!(parse_answer(&rating, "4"), Some(AnswerValue::Rating(4)));
        assert_eq!(parse_answer(&rating, "four"), None);
    }

    #[tokio::test]
    async fn empty_link_fails_before_any_request() {
        let api = gateway("http://127.0.0.1:9", false);
        let err = run(&api, "", |_, _| None).await.expect_err("no link");
        assert_eq!(err.to_string(), "Невалідне посилання на опитування");
        assert!(matches!(err, CommandError::Invalid(_)));
    }

    #[tokio::test]
    async fn reasks_only_flagged_questions_then_submits() {
        let mut server = mockito::Server::new_async().await;
        let _get = server
            .mock("GET", "/public/survey/abc")
            .with_status(200)
            .with_body(r#"{"data":{"_id":"s1","title":"Настрій","questions":[
                {"_id":"q1","questionText":"Ім'я","questionType":"text","required":false},
                {"_id":"q2","questionText":"Оцінка","questionType":"rating","required":true}
            ]}}"#)
            .create_async()
            .await;
        let submit = server
            .mock("POST", "/public/survey/abc/submit")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "answers": [
                    { "questionId": "q1", "answerValue": "Олена" },
                    { "questionId": "q2", "answerValue": 5 }
                ]
            })))
            .with_status(201)
            .with_body(r#"{"message":"ok"}"#)
            .expect(1)
            .create_async()
            .await;

        let api = gateway(&server.url(), false);
        let mut asked = Vec::new();
        let summary = run(&api, "abc", |q, issue| {
            asked.push((q.id.clone(), issue.map(str::to_string)));
            match (q.id.as_str(), issue) {
                ("q1", _) => Some("Олена".to_string()),
                ("q2", None) => None,
                ("q2", Some(_)) => Some("5".to_string()),
                _ => None,
            }
        })
        .await
        .expect("submitted");

        assert_eq!(summary.answered, 2);
        assert_eq!(summary.total, 2);
        assert_eq!(asked.len(), 3);
        assert_eq!(asked[2], ("q2".to_string(), Some("Це поле обов'язкове".to_string())));
        submit.assert_async().await;
    }
}
