use serde::Serialize;
use tera::{Context, Tera};

use crate::gateway::types::{QuestionAnalytics, SurveyAnalytics, User};
use crate::render::helpers::{format_date_uk, format_duration};
use crate::survey::SurveyDefinition;

const SURVEY_REPORT: &str = "survey_report.txt";
const DASHBOARD: &str = "dashboard.txt";

const SURVEY_REPORT_TEMPLATE: &str = r#"{{ title }}
Статус: {{ status }}{% if created %} · Створено {{ created }}{% endif %}
Посилання: {{ link }}

Всього відповідей: {{ total_responses }}
Середній час: {{ average_time }}
Питань: {{ question_count }}
{% if by_date %}
Відповіді за датами:
{% for day in by_date %}  {{ day.date }}: {{ day.count }}
{% endfor %}{% endif %}{% if not has_analytics %}
Немає даних для аналітики
{% elif total_responses == 0 %}
Ще немає відповідей на це опитування
{% else %}{% for q in questions %}
{{ q.number }}. {{ q.text }}
   {{ q.total_answers }} відповідей • {{ q.type_label }}
{% if q.is_text %}{% for answer in q.answers %}   - {{ answer }}
{% endfor %}{% if q.hidden > 0 %}   Показано {{ q.answers | length }} з {{ q.total_answers }}
{% endif %}{% else %}{% for bar in q.bars %}   {{ bar.label }}: {{ bar.value }} відповідей ({{ bar.percent }}%)
{% endfor %}{% endif %}{% endfor %}{% endif %}"#;

const DASHBOARD_TEMPLATE: &str = r#"{% if username %}Вітаємо, {{ username }}!
{% endif %}Опитувань: {{ total }} · Активних: {{ active }} · Відповідей: {{ responses }}
{% if surveys %}{% for s in surveys %}
[{{ s.id }}] {{ s.title }}
   {{ s.status }} · {{ s.response_count }} відповідей{% if s.created %} · {{ s.created }}{% endif %}
{% endfor %}{% else %}
У вас ще немає опитувань
{% endif %}"#;

#[derive(Serialize)]
struct Bar {
  label: String,
  value: u64,
  percent: String,
}

#[derive(Serialize)]
struct QuestionSection {
  number: usize,
  text: String,
  type_label: &'static str,
  total_answers: u64,
  is_text: bool,
  bars: Vec<Bar>,
  answers: Vec<String>,
  hidden: u64,
}

#[derive(Serialize)]
struct DayRow {
  date: String,
  count: u64,
}

#[derive(Serialize)]
struct SurveyRow {
  id: String,
  title: String,
  status: &'static str,
  response_count: u64,
  created: Option<String>,
}

fn status_label(active: bool) -> &'static str {
  if active {
    "Активне"
  } else {
    "Неактивне"
  }
}

fn question_section(index: usize, question: &QuestionAnalytics) -> QuestionSection {
  let data = question.data.clone().unwrap_or_default();
  let bars = data
    .label_strings()
    .into_iter()
    .zip(data.values.iter().copied())
    .zip(data.percentages())
    .map(|((label, value), pct)| Bar {
      label,
      value,
      percent: format!("{pct:.1}"),
    })
    .collect();
  QuestionSection {
    number: index + 1,
    text: question.question_text.clone(),
    type_label: question.question_type.label(),
    total_answers: question.total_answers,
    is_text: data.is_text(),
    hidden: data.hidden_answers(),
    answers: data.answers,
    bars,
  }
}

fn engine() -> Result<Tera, String> {
  let mut tera = Tera::default();
  tera
    .add_raw_templates(vec![
      (SURVEY_REPORT, SURVEY_REPORT_TEMPLATE),
      (DASHBOARD, DASHBOARD_TEMPLATE),
    ])
    .map_err(|e| format!("Template load failed: {e}"))?;
  Ok(tera)
}

fn render(name: &str, ctx: &Context) -> Result<String, String> {
  engine()?
    .render(name, ctx)
    .map_err(|e| format!("Render failed for {name}: {e}"))
}

/// Text version of the survey detail page: overview plus per-question results.
pub fn render_survey_report(
  survey: &SurveyDefinition,
  analytics: Option<&SurveyAnalytics>,
  public_link: &str,
) -> Result<String, String> {
  let mut ctx = Context::new();
  ctx.insert("title", &survey.title);
  ctx.insert("status", status_label(survey.is_active));
  ctx.insert("created", &survey.created_at.as_ref().map(format_date_uk));
  ctx.insert("link", public_link);
  ctx.insert("question_count", &survey.questions.len());
  ctx.insert("has_analytics", &analytics.is_some());

  let summary = analytics.map(|a| a.summary.clone()).unwrap_or_default();
  ctx.insert("total_responses", &summary.total_responses);
  ctx.insert(
    "average_time",
    &format_duration(summary.average_completion_time.max(0.0).floor() as u64),
  );

  let by_date: Vec<DayRow> = analytics
    .map(|a| {
      a.responses_by_date
        .iter()
        .map(|d| DayRow {
          date: d.date.clone(),
          count: d.count,
        })
        .collect()
    })
    .unwrap_or_default();
  ctx.insert("by_date", &by_date);

  let questions: Vec<QuestionSection> = analytics
    .map(|a| {
      a.question_analytics
        .iter()
        .enumerate()
        .map(|(i, q)| question_section(i, q))
        .collect()
    })
    .unwrap_or_default();
  ctx.insert("questions", &questions);

  render(SURVEY_REPORT, &ctx)
}

pub fn render_dashboard(
  user: Option<&User>,
  surveys: &[SurveyDefinition],
  active: usize,
  responses: u64,
) -> Result<String, String> {
  let rows: Vec<SurveyRow> = surveys
    .iter()
    .map(|s| SurveyRow {
      id: s.id.clone(),
      title: s.title.clone(),
      status: status_label(s.is_active),
      response_count: s.response_count,
      created: s.created_at.as_ref().map(format_date_uk),
    })
    .collect();

  let mut ctx = Context::new();
  ctx.insert("username", &user.map(|u| u.username.clone()));
  ctx.insert("total", &surveys.len());
  ctx.insert("active", &active);
  ctx.insert("responses", &responses);
  ctx.insert("surveys", &rows);
  render(DASHBOARD, &ctx)
}
