//! Integration tests for the parsing pipeline
//!
//! These tests run a release laid out like the monthly bulletin through the
//! built-in definitions: the main indicator section plus the consolidated
//! and federal budget sections.

use chrono::NaiveDate;
use kep_processor::definitions::{builtin_checkpoints, builtin_config};
use kep_processor::{
    DuplicatePolicy, FrameWriter, KepError, OutputFormat, parse_and_validate, parse_text,
};
use tempfile::TempDir;

fn line(cells: &[&str]) -> String {
    cells.join("\t")
}

/// Release text with every label the built-in definitions require
fn bulletin() -> String {
    let rows: Vec<String> = vec![
        line(&["1. Основные экономические и социальные показатели"]),
        line(&["Объем ВВП, млрд.рублей"]),
        line(&["1999", "4823", "901", "1102", "1373", "1447"]),
        line(&["2000", "7306", "1527", "1697", "2038", "2044"]),
        line(&["в % к соответствующему периоду предыдущего года"]),
        line(&["1999", "106,4", "98,1", "103,1", "111,4", "112,0"]),
        line(&["2000", "110,0", "111,4", "110,2", "110,5", "109,2"]),
        line(&["Индекс промышленного производства 1), в % к соответствующему периоду предыдущего года"]),
        line(&[
            "2016", "101,3", "99,2", "99,8", "101,5", "100,5", "100,7", "101,7", "100,3",
            "99,4", "101,2", "99,7", "102,7", "103,2",
        ]),
        line(&["в % к предыдущему периоду"]),
        line(&[
            "2016", "", "73,5", "101,3", "112,3", "94,4", "99,5", "100,8", "99,6", "101,8",
            "101,4", "104,3", "98,5", "109,3",
        ]),
        line(&["Индексы потребительских цен, в % к предыдущему месяцу"]),
        line(&[
            "2016", "105,4", "101,0", "100,6", "100,5", "100,4", "100,4", "100,4", "100,5",
            "100,0", "100,2", "100,4", "100,4", "100,4",
        ]),
        line(&["Оборот розничной торговли, млрд.рублей"]),
        line(&[
            "2016", "28141", "2012", "2018", "2202", "2197", "2269", "2312", "2402", "2448",
            "2366", "2406", "2402", "3107",
        ]),
        line(&["в % к соответствующему периоду предыдущего года"]),
        line(&[
            "2016", "94,8", "94,0", "96,1", "94,4", "95,2", "93,6", "93,8", "94,8", "95,3",
            "96,3", "94,6", "95,9", "94,1",
        ]),
        line(&["Инвестиции в основной капитал, млрд.рублей"]),
        line(&["2016", "14640", "2134 2)", "3193", "3838", "5475"]),
        line(&["Среднемесячная номинальная начисленная заработная плата, рублей"]),
        line(&[
            "2016", "36703", "32422", "33240", "36196", "36377", "36112", "39550", "36680",
            "34858", "35312", "35956", "35845", "…",
        ]),
        line(&["Консолидированный бюджет"]),
        line(&["Доходы, млрд.рублей"]),
        line(&[
            "2016", "28181", "1961", "4095", "6450", "8910", "11176", "13569", "15946",
            "18139", "20500", "22920", "25181",
        ]),
        line(&["Расходы, млрд.рублей"]),
        line(&[
            "2016", "31324", "1715", "4270", "7050", "9554", "12110", "14777", "17366",
            "19848", "22310", "24914", "27360",
        ]),
        line(&["Федеральный бюджет"]),
        line(&["Доходы, млрд.рублей"]),
        line(&[
            "2016", "13460", "958", "1937", "3088", "4226", "5201", "6398", "7523", "8565",
            "9751", "10874", "12031",
        ]),
        line(&["Расходы, млрд.рублей"]),
        line(&[
            "2016", "16416", "1219", "2493", "3915", "5228", "6520", "8044", "9317", "10637",
            "11939", "13237", "14526",
        ]),
        line(&["Внешняя торговля"]),
        line(&["Экспорт товаров, млрд.долларов"]),
        line(&["2016", "285,5", "61,7", "69,4", "67,9", "86,5"]),
    ];
    rows.join("\n")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_bulletin_passes_builtin_checkpoints() {
    let config = builtin_config().unwrap();
    let (frames, report) = parse_and_validate(&bulletin(), &config, &builtin_checkpoints()).unwrap();

    assert!(report.is_ok(), "failures: {:?}", report.failures);
    assert_eq!(report.checked, 5);

    assert_eq!(frames.annual.get("GDP_yoy", date(1999, 12, 31)), Some(106.4));
    assert_eq!(frames.quarterly.get("GDP_yoy", date(2000, 6, 30)), Some(110.2));
}

#[test]
fn test_main_section_tables() {
    let config = builtin_config().unwrap();
    let frames = parse_text(&bulletin(), &config).unwrap();

    assert_eq!(frames.monthly.get("IND_PROD_yoy", date(2016, 1, 31)), Some(99.2));
    assert_eq!(frames.monthly.get("IND_PROD_rog", date(2016, 12, 31)), Some(109.3));
    assert_eq!(frames.annual.get("IND_PROD_rog", date(2016, 12, 31)), None);

    assert_eq!(frames.annual.get("CPI_rog", date(2016, 12, 31)), Some(105.4));
    assert_eq!(frames.monthly.get("RETAIL_SALES_bln_rub", date(2016, 12, 31)), Some(3107.0));
    assert_eq!(frames.quarterly.get("INVESTMENT_bln_rub", date(2016, 3, 31)), Some(2134.0));

    assert_eq!(frames.monthly.get("WAGE_NOMINAL_rub", date(2016, 11, 30)), Some(35845.0));
    assert_eq!(frames.monthly.get("WAGE_NOMINAL_rub", date(2016, 12, 31)), None);

    assert!(!frames.annual.labels().any(|label| label.contains("bln_usd")));
}

#[test]
fn test_budget_sections_are_deaccumulated() {
    let config = builtin_config().unwrap();
    let frames = parse_text(&bulletin(), &config).unwrap();

    assert_eq!(
        frames.annual.get("GOV_REVENUE_CONSOLIDATED_bln_rub", date(2016, 12, 31)),
        Some(28181.0)
    );
    assert_eq!(
        frames.monthly.get("GOV_REVENUE_CONSOLIDATED_bln_rub", date(2016, 1, 31)),
        Some(1961.0)
    );
    assert_eq!(
        frames.monthly.get("GOV_REVENUE_CONSOLIDATED_bln_rub", date(2016, 2, 29)),
        Some(2134.0)
    );
    assert_eq!(
        frames.monthly.get("GOV_EXPENSE_FEDERAL_bln_rub", date(2016, 12, 31)),
        Some(1890.0)
    );
    assert!(
        !frames
            .monthly
            .labels()
            .any(|label| label.contains("_ACCUM"))
    );
}

#[test]
fn test_missing_budget_section_fails() {
    let config = builtin_config().unwrap();
    let text = bulletin().replace("Консолидированный бюджет", "Бюджет");
    match parse_text(&text, &config) {
        Err(KepError::BoundaryNotFound { unit, .. }) => assert_eq!(unit, "consolidated_budget"),
        other => panic!("Expected BoundaryNotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_conflicting_rows_follow_duplicate_policy() {
    let text = format!(
        "{}\n{}\n{}",
        line(&["Объем ВВП, млрд.рублей"]),
        line(&["1999", "4823", "901", "1102", "1373", "1447"]),
        line(&["1999", "4800", "901", "1102", "1373", "1447"]),
    );
    let main = builtin_config()
        .unwrap()
        .parsing_units
        .into_iter()
        .find(|unit| unit.name == "main")
        .unwrap();
    let main = kep_processor::ParsingUnit {
        required: vec![kep_processor::Label::new("GDP", "bln_rub")],
        ..main
    };
    let config = kep_processor::ParsingConfig::new(
        kep_processor::definitions::builtin_units(),
        vec![main],
    )
    .unwrap();

    assert!(matches!(
        parse_text(&text, &config),
        Err(KepError::ConflictingObservation { .. })
    ));

    let frames = parse_text(&text, &config.with_duplicate_policy(DuplicatePolicy::FirstWins)).unwrap();
    assert_eq!(frames.annual.get("GDP_bln_rub", date(1999, 12, 31)), Some(4823.0));
}

#[test]
fn test_frames_written_as_parquet() {
    let config = builtin_config().unwrap();
    let frames = parse_text(&bulletin(), &config).unwrap();

    let temp_dir = TempDir::new().unwrap();
    let writer = FrameWriter::new(temp_dir.path().join("2017-01"), OutputFormat::Parquet);
    let written = writer.write(&frames).unwrap();

    assert_eq!(written.len(), 3);
    for path in &written {
        assert!(std::fs::metadata(path).unwrap().len() > 0);
    }
}
