//! Console tables of a role analysis.

use ordinalizer::Ordinal;
use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};
use strum::IntoEnumIterator;

use crate::analysis::RoleAnalysis;
use crate::dataset::Feature;
use crate::linear::Matrix;

fn right(width: usize) -> Col {
    Col::new(Styles::default().with(MinWidth(width)).with(HAlign::Right))
}

fn header(cells: Vec<String>) -> Row {
    Row::new(
        Styles::default().with(Header(true)),
        cells.into_iter().map(Into::into).collect(),
    )
}

pub fn tabulate_summaries(analysis: &RoleAnalysis) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(Styles::default().with(MinWidth(10)))];
            cols.extend((0..8).map(|_| right(10)));
            cols
        })
        .with_row(header(
            ["Feature", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max"]
                .map(String::from)
                .to_vec(),
        ));
    for (feature, summary) in &analysis.summaries {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                feature.to_string().into(),
                summary.count.to_string().into(),
                format!("{:.2}", summary.mean).into(),
                format!("{:.2}", summary.std).into(),
                format!("{:.0}", summary.min).into(),
                format!("{:.2}", summary.q25).into(),
                format!("{:.2}", summary.median).into(),
                format!("{:.2}", summary.q75).into(),
                format!("{:.0}", summary.max).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_correlations(correlations: &Matrix) -> Table {
    let mut table = Table::default()
        .with_cols({
            let mut cols = vec![Col::new(
                Styles::default().with(MinWidth(10)).with(Separator(true)),
            )];
            cols.extend(Feature::iter().map(|_| right(10)));
            cols
        })
        .with_row(header(
            Some(String::new())
                .into_iter()
                .chain(Feature::iter().map(|feature| feature.to_string()))
                .collect(),
        ));
    for (row, feature) in Feature::iter().enumerate() {
        let cells = Some(feature.to_string())
            .into_iter()
            .chain(correlations.row_slice(row).iter().map(|r| format!("{r:.3}")))
            .map(Into::into)
            .collect();
        table.push_row(Row::new(Styles::default(), cells));
    }
    table
}

pub fn tabulate_coefficients(analysis: &RoleAnalysis) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10))),
            right(12),
            right(10),
            right(10),
        ])
        .with_row(header(
            ["Regressor", "Coefficient", "Mean", "Scale"]
                .map(String::from)
                .to_vec(),
        ));
    table.push_row(Row::new(
        Styles::default(),
        vec![
            "intercept".into(),
            format!("{:.6}", analysis.model.intercept).into(),
            "".into(),
            "".into(),
        ],
    ));
    for feature in Feature::iter() {
        let index = feature.ordinal();
        table.push_row(Row::new(
            Styles::default(),
            vec![
                feature.to_string().into(),
                format!("{:.6}", analysis.model.coefficients[index]).into(),
                format!("{:.2}", analysis.scaler.means[index]).into(),
                format!("{:.2}", analysis.scaler.scales[index]).into(),
            ],
        ));
    }
    table
}

pub fn tabulate_metrics(analysis: &RoleAnalysis) -> Table {
    let evaluation = &analysis.evaluation;
    let rows = [
        ("CV ROC-AUC (mean)", analysis.cv_auc_mean()),
        ("ROC-AUC", evaluation.roc_auc),
        ("KS", evaluation.ks),
        ("F1", evaluation.confusion.f1()),
        ("Brier", evaluation.brier),
        ("Sensitivity", evaluation.confusion.sensitivity()),
        ("Specificity", evaluation.confusion.specificity()),
    ];
    let mut table = Table::default()
        .with_cols(vec![Col::new(Styles::default().with(MinWidth(18))), right(10)])
        .with_row(header(vec!["Metric".into(), "Value".into()]));
    for (metric, value) in rows {
        table.push_row(Row::new(
            Styles::default(),
            vec![metric.into(), format!("{value:.4}").into()],
        ));
    }
    table
}

pub fn tabulate_calibration(analysis: &RoleAnalysis) -> Table {
    let mut table = Table::default()
        .with_cols(vec![right(12), right(8), right(10), right(10)])
        .with_row(header(
            ["Bin", "Count", "Predicted", "Observed"]
                .map(String::from)
                .to_vec(),
        ));
    for bin in &analysis.evaluation.calibration {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                format!("{:.1}–{:.1}", bin.lower, bin.upper).into(),
                bin.count.to_string().into(),
                format!("{:.4}", bin.mean_predicted).into(),
                format!("{:.4}", bin.observed_rate).into(),
            ],
        ));
    }
    table
}
