//! Built-in parsing definitions for the monthly bulletin.
//!
//! The vocabulary below covers the core macroeconomic series and the
//! consolidated and federal budget sections. Callers with a different
//! bulletin layout pass their own [`ParsingConfig`] instead.

use crate::config::{ParsingConfig, ParsingUnit, RowReader, UnitPattern};
use crate::error::Result;
use crate::models::{Checkpoint, CheckpointSet};

/// Unit texts and their codes
const UNITS: &[(&str, &str)] = &[
    ("млрд.рублей", "bln_rub"),
    ("млрд. рублей", "bln_rub"),
    ("млн.рублей", "mln_rub"),
    ("рублей", "rub"),
    ("млрд.долларов", "bln_usd"),
    ("млрд. долларов", "bln_usd"),
    ("в % к соответствующему периоду предыдущего года", "yoy"),
    ("в % к соответствующему месяцу предыдущего года", "yoy"),
    ("в % к предыдущему периоду", "rog"),
    ("в % к предыдущему месяцу", "rog"),
    ("отчетный месяц в % к декабрю предыдущего года", "ytd"),
    (
        "период с начала отчетного года в % к соответствующему периоду предыдущего года",
        "ytd",
    ),
];

fn main_unit() -> ParsingUnit {
    ParsingUnit::new("main")
        .with_header("Объем ВВП", "GDP")
        .with_header("Валовой внутренний продукт", "GDP")
        .with_header("Индекс промышленного производства", "IND_PROD")
        .with_header("Индексы потребительских цен", "CPI")
        .with_header("Индекс потребительских цен", "CPI")
        .with_header("Оборот розничной торговли", "RETAIL_SALES")
        .with_header("Инвестиции в основной капитал", "INVESTMENT")
        .with_header("Среднемесячная номинальная начисленная заработная плата", "WAGE_NOMINAL")
        .require("GDP", "bln_rub")
        .require("GDP", "yoy")
        .require("IND_PROD", "yoy")
        .require("IND_PROD", "rog")
        .require("CPI", "rog")
        .require("RETAIL_SALES", "bln_rub")
        .require("RETAIL_SALES", "yoy")
        .require("INVESTMENT", "bln_rub")
        .require("WAGE_NOMINAL", "rub")
}

fn consolidated_budget_unit() -> ParsingUnit {
    ParsingUnit::new("consolidated_budget")
        .with_boundary(
            "Консолидированный бюджет",
            "Федеральный бюджет",
        )
        .with_boundary(
            "Исполнение консолидированного бюджета",
            "Исполнение федерального бюджета",
        )
        .with_header("Доходы", "GOV_REVENUE_ACCUM_CONSOLIDATED")
        .with_header("Расходы", "GOV_EXPENSE_ACCUM_CONSOLIDATED")
        .require("GOV_REVENUE_ACCUM_CONSOLIDATED", "bln_rub")
        .require("GOV_EXPENSE_ACCUM_CONSOLIDATED", "bln_rub")
        .with_reader(RowReader::Fiscal)
}

fn federal_budget_unit() -> ParsingUnit {
    ParsingUnit::new("federal_budget")
        .with_boundary("Федеральный бюджет", "Внешняя торговля")
        .with_boundary(
            "Исполнение федерального бюджета",
            "Внешнеэкономическая деятельность",
        )
        .with_header("Доходы", "GOV_REVENUE_ACCUM_FEDERAL")
        .with_header("Расходы", "GOV_EXPENSE_ACCUM_FEDERAL")
        .require("GOV_REVENUE_ACCUM_FEDERAL", "bln_rub")
        .require("GOV_EXPENSE_ACCUM_FEDERAL", "bln_rub")
        .with_reader(RowReader::Fiscal)
}

/// Unit vocabulary shared by all built-in parsing units
pub fn builtin_units() -> Vec<UnitPattern> {
    UNITS
        .iter()
        .map(|(pattern, code)| UnitPattern {
            pattern: pattern.to_string(),
            code: code.to_string(),
        })
        .collect()
}

/// Parsing configuration for the monthly bulletin layout
pub fn builtin_config() -> Result<ParsingConfig> {
    ParsingConfig::new(
        builtin_units(),
        vec![consolidated_budget_unit(), federal_budget_unit(), main_unit()],
    )
}

/// Values known from published releases
pub fn builtin_checkpoints() -> CheckpointSet {
    CheckpointSet {
        mandatory: vec![
            Checkpoint::annual("GDP_bln_rub", 1999, 4823.0),
            Checkpoint::annual("GDP_bln_rub", 2000, 7306.0),
            Checkpoint::quarterly("GDP_bln_rub", 1999, 1, 901.0),
            Checkpoint::quarterly("GDP_bln_rub", 2000, 4, 2044.0),
        ],
        optional: vec![vec![
            Checkpoint::monthly("CPI_rog", 2016, 12, 100.4),
            Checkpoint::monthly("CPI_rog", 2016, 12, 100.3),
        ]],
    }
}
