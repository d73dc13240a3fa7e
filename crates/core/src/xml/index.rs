use super::{XSI_NAMESPACE, finish, new_writer, write_text_element};
use crate::error::Result;
use classpeek_api::{IndexReport, MetricSection};
use quick_xml::events::{BytesEnd, BytesStart, Event};

/// Renders the run report. Scores that do not apply are written as `NaN`.
pub fn index_document(report: &IndexReport) -> Result<String> {
    let mut writer = new_writer()?;

    let mut root = BytesStart::new("index");
    root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    root.push_attribute(("xsi:noNamespaceSchemaLocation", report.schema()));
    root.push_attribute(("version", env!("CARGO_PKG_VERSION")));
    writer.write_event(Event::Start(root))?;

    for section in report.metrics() {
        writer.write_event(Event::Start(metric_start(section)))?;
        for (class_id, score) in &section.entries {
            let value = score.to_string();
            let mut element = BytesStart::new("class");
            element.push_attribute(("id", class_id.as_str()));
            element.push_attribute(("value", value.as_str()));
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new("metric")))?;
    }

    for failure in report.failures() {
        let mut element = BytesStart::new("failure");
        element.push_attribute(("unit", failure.unit.as_str()));
        write_text_element(&mut writer, element, &failure.reason)?;
    }

    writer.write_event(Event::End(BytesEnd::new("index")))?;
    finish(writer)
}

fn metric_start(section: &MetricSection) -> BytesStart<'static> {
    let summary = &section.summary;
    let mut element = BytesStart::new("metric");
    element.push_attribute(("name", section.name.as_str()));
    element.push_attribute(("min", summary.min.to_string().as_str()));
    element.push_attribute(("max", summary.max.to_string().as_str()));
    element.push_attribute(("mean", summary.mean.to_string().as_str()));
    element.push_attribute(("classes", summary.applicable.to_string().as_str()));
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use classpeek_api::{MetricSummary, RUN_SCOPE_ID, Score, UnitFailure};

    fn section(name: &str, entries: Vec<(&str, Score)>) -> MetricSection {
        let entries: Vec<(String, Score)> = entries
            .into_iter()
            .map(|(id, score)| (id.to_string(), score))
            .collect();
        let summary = MetricSummary::of(entries.iter().map(|(_, s)| s));
        MetricSection {
            name: name.to_string(),
            entries,
            summary,
        }
    }

    #[test]
    fn test_index_document() {
        let report = IndexReport::new(
            "xsd/index.xsd",
            vec![
                section("LCOM", vec![("a.A", Score::Value(2.0)), ("a.B", Score::NotApplicable)]),
                section("TCC", vec![(RUN_SCOPE_ID, Score::NotApplicable)]),
            ],
            vec![UnitFailure {
                unit: "broken/Bad.class".into(),
                reason: "truncated".into(),
            }],
        );
        let xml = index_document(&report).unwrap();
        assert!(xml.contains("xsi:noNamespaceSchemaLocation=\"xsd/index.xsd\""));
        assert!(xml.contains("<metric name=\"LCOM\" min=\"2\" max=\"2\" mean=\"2\" classes=\"1\">"));
        assert!(xml.contains("<class id=\"a.A\" value=\"2\"/>"));
        assert!(xml.contains("<class id=\"a.B\" value=\"NaN\"/>"));
        assert!(xml.contains("<metric name=\"TCC\" min=\"NaN\" max=\"NaN\" mean=\"NaN\" classes=\"0\">"));
        assert!(xml.contains("<failure unit=\"broken/Bad.class\">truncated</failure>"));
        assert!(xml.find("LCOM").unwrap() < xml.find("TCC").unwrap());
    }
}
