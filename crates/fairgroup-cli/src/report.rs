//! Rendering a grouping for people to read.

use std::io;

use fairgroup_evaluator::group_evaluator::GroupScore;
use fairgroup_model::{Assignment, Individual, TraitCatalogue};

use crate::schema::report::GroupReport;

/// Collects the members and score components of every group.
pub fn group_reports(
    individuals: &[Individual],
    catalogue: &TraitCatalogue,
    assignment: &Assignment,
    breakdown: &[GroupScore],
) -> Vec<GroupReport> {
    breakdown
        .iter()
        .map(|score| GroupReport {
            number: score.group + 1,
            size: score.size,
            fitness: score.total,
            size_score: score.size_score,
            trait_scores: catalogue
                .traits()
                .iter()
                .zip(&score.trait_scores)
                .map(|(summary, &value)| (summary.name().to_owned(), value))
                .collect(),
            members: assignment
                .members(score.group)
                .map(|i| individuals[i].id().to_owned())
                .collect(),
        })
        .collect()
}

/// Writes every group as a heading followed by one line per member.
///
/// ```text
/// = Group #1 (2 members, fitness 3.500)
/// Ada (f, dev, senior, acme, red)
/// Bob (m, design, junior, acme, blue)
/// ```
pub fn write_groups<W>(
    writer: &mut W,
    individuals: &[Individual],
    assignment: &Assignment,
    breakdown: &[GroupScore],
) -> io::Result<()>
where
    W: io::Write + ?Sized,
{
    for score in breakdown {
        writeln!(
            writer,
            "= Group #{} ({} members, fitness {:.3})",
            score.group + 1,
            score.size,
            score.total
        )?;
        for i in assignment.members(score.group) {
            writeln!(writer, "{}", individuals[i])?;
        }
    }
    Ok(())
}

/// Writes the score components of every group as an aligned table.
pub fn write_breakdown<W>(
    writer: &mut W,
    catalogue: &TraitCatalogue,
    breakdown: &[GroupScore],
) -> io::Result<()>
where
    W: io::Write + ?Sized,
{
    write!(writer, "{:>6} {:>5} {:>9}", "group", "size", "size")?;
    for summary in catalogue.traits() {
        write!(writer, " {:>10}", summary.name())?;
    }
    writeln!(writer, " {:>9}", "total")?;

    for score in breakdown {
        write!(
            writer,
            "{:>6} {:>5} {:>9.3}",
            score.group + 1,
            score.size,
            score.size_score
        )?;
        for value in &score.trait_scores {
            write!(writer, " {value:>10.3}")?;
        }
        writeln!(writer, " {:>9.3}", score.total)?;
    }
    let total: f64 = breakdown.iter().map(|s| s.total).sum();
    writeln!(writer, "fitness: {total:.5}")
}

/// Writes every trait's distinct values with their share of the population.
pub fn write_catalogue<W>(writer: &mut W, catalogue: &TraitCatalogue) -> io::Result<()>
where
    W: io::Write + ?Sized,
{
    writeln!(writer, "{} individuals", catalogue.population_size())?;
    for summary in catalogue.traits() {
        writeln!(
            writer,
            "{} ({} values)",
            summary.name(),
            summary.value_count()
        )?;
        for value in summary.values() {
            writeln!(
                writer,
                "  {:<20} {:>5} {:>6.1}%",
                value.label,
                value.count,
                value.proportion * 100.0
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use fairgroup_evaluator::{group_evaluator::GroupingEvaluator, weights::FitnessWeights};

    use super::*;

    fn setup() -> (Vec<Individual>, TraitCatalogue, GroupingEvaluator) {
        let individuals = vec![
            Individual::new("Ada", ["f", "dev"]),
            Individual::new("Bob", ["m", "dev"]),
            Individual::new("Cy", ["f", "ops"]),
            Individual::new("Di", ["m", "ops"]),
        ];
        let catalogue = TraitCatalogue::build(&individuals, &["gender", "discipline"]).unwrap();
        let evaluator =
            GroupingEvaluator::new(&catalogue, &individuals, &FitnessWeights::default(), 2)
                .unwrap();
        (individuals, catalogue, evaluator)
    }

    #[test]
    fn test_write_groups() {
        let (individuals, _, evaluator) = setup();
        let assignment = Assignment::new(vec![1, 0, 0, 1]);
        let breakdown = evaluator.breakdown(&assignment);

        let mut out = vec![];
        write_groups(&mut out, &individuals, &assignment, &breakdown).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "\
= Group #1 (2 members, fitness 4.000)
Bob (m, dev)
Cy (f, ops)
= Group #2 (2 members, fitness 4.000)
Ada (f, dev)
Di (m, ops)
"
        );
    }

    #[test]
    fn test_group_reports_name_traits_and_members() {
        let (individuals, catalogue, evaluator) = setup();
        let assignment = Assignment::new(vec![0, 0, 1, 1]);
        let breakdown = evaluator.breakdown(&assignment);
        let reports = group_reports(&individuals, &catalogue, &assignment, &breakdown);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].number, 1);
        assert_eq!(reports[0].members, vec!["Ada", "Bob"]);
        // both members are developers
        assert_eq!(reports[0].trait_scores["discipline"], 0.5);
        assert_eq!(reports[0].trait_scores["gender"], 2.0);
    }

    #[test]
    fn test_write_catalogue() {
        let (_, catalogue, _) = setup();
        let mut out = vec![];
        write_catalogue(&mut out, &catalogue).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("4 individuals\ngender (2 values)\n"));
        assert!(text.contains("50.0%"));
    }
}
