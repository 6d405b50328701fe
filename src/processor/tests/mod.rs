//! Integration tests for the processor module
//!
//! Runs whole releases through parsing, validation and output using small
//! bulletin texts built in the tests.


use crate::config::{ParsingConfig, ParsingUnit, RowReader, UnitPattern};

/// GDP two-year sample with annual and quarterly values
pub const GDP_SAMPLE: &str = "Объем ВВП...\n\
1999\t4823\t901\t1102\t1373\t1447\n\
2000\t7306\t1527\t1697\t2038\t2044";

/// Units used by the test configurations
pub fn test_units() -> Vec<UnitPattern> {
    [
        ("млрд.рублей", "bln_rub"),
        ("в % к соответствующему периоду предыдущего года", "yoy"),
    ]
    .iter()
    .map(|(pattern, code)| UnitPattern {
        pattern: pattern.to_string(),
        code: code.to_string(),
    })
    .collect()
}

/// Single default unit tracking GDP in billion roubles
pub fn gdp_config() -> ParsingConfig {
    let main = ParsingUnit::new("main")
        .with_header("Объем ВВП", "GDP")
        .require("GDP", "bln_rub");
    ParsingConfig::new(test_units(), vec![main]).unwrap()
}

/// GDP in the default unit plus a boundary-scoped budget section
pub fn budget_config() -> ParsingConfig {
    let budget = ParsingUnit::new("budget")
        .with_boundary("Консолидированный бюджет", "Федеральный бюджет")
        .with_header("Доходы", "GOV_REVENUE_ACCUM_CONSOLIDATED")
        .require("GOV_REVENUE_ACCUM_CONSOLIDATED", "bln_rub")
        .with_reader(RowReader::Fiscal);
    let main = ParsingUnit::new("main")
        .with_header("Объем ВВП", "GDP")
        .require("GDP", "bln_rub");
    ParsingConfig::new(test_units(), vec![budget, main]).unwrap()
}
