//! Dependency ordering of classifiers.
//!
//! Every classifier declares the labels it reads. [`Schedule::new`] orders
//! the classifiers so each runs after the producers of everything it
//! requires (Kahn's algorithm, ties broken by registration order). Cycles,
//! duplicate outputs and requirements nobody produces are configuration
//! errors reported once, before any page is touched.

use super::classifier::Classifier;
use super::Label;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Classifiers in execution order.
pub struct Schedule {
    classifiers: Vec<Box<dyn Classifier>>,
    by_label: BTreeMap<Label, usize>,
}

impl Schedule {
    /// Validate the dependency graph and order the classifiers.
    pub fn new(classifiers: Vec<Box<dyn Classifier>>) -> Result<Self> {
        let mut producer: BTreeMap<Label, usize> = BTreeMap::new();
        for (i, c) in classifiers.iter().enumerate() {
            if producer.insert(c.output(), i).is_some() {
                return Err(Error::DuplicateClassifier(c.output()));
            }
        }

        let n = classifiers.len();
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut in_degree = vec![0usize; n];
        for (i, c) in classifiers.iter().enumerate() {
            let mut seen = BTreeSet::new();
            for &label in c.requires() {
                let Some(&j) = producer.get(&label) else {
                    return Err(Error::MissingDependency {
                        classifier: c.output(),
                        label,
                    });
                };
                if seen.insert(j) {
                    dependents[j].push(i);
                    in_degree[i] += 1;
                }
            }
        }

        // Ready set ordered by registration index keeps the order stable.
        let mut ready: BTreeSet<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while let Some(i) = ready.pop_first() {
            order.push(i);
            for &d in &dependents[i] {
                in_degree[d] -= 1;
                if in_degree[d] == 0 {
                    ready.insert(d);
                }
            }
        }

        if order.len() != n {
            let chain = find_cycle(&classifiers, &producer, &in_degree);
            return Err(Error::DependencyCycle { chain });
        }

        let mut slots: Vec<Option<Box<dyn Classifier>>> = classifiers.into_iter().map(Some).collect();
        let classifiers: Vec<Box<dyn Classifier>> =
            order.iter().filter_map(|&i| slots[i].take()).collect();
        let by_label = classifiers
            .iter()
            .enumerate()
            .map(|(i, c)| (c.output(), i))
            .collect();

        log::debug!(
            "classifier order: {}",
            classifiers
                .iter()
                .map(|c| c.output().as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(Self {
            classifiers,
            by_label,
        })
    }

    /// The classifier producing `label`.
    pub fn get(&self, label: Label) -> Option<&dyn Classifier> {
        self.by_label.get(&label).map(|&i| self.classifiers[i].as_ref())
    }

    /// Classifiers in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Classifier> {
        self.classifiers.iter().map(|c| c.as_ref())
    }

    /// Output labels in execution order.
    pub fn labels(&self) -> Vec<Label> {
        self.classifiers.iter().map(|c| c.output()).collect()
    }

    /// Number of classifiers.
    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    /// Whether no classifier is registered.
    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }
}

impl std::fmt::Debug for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.labels()).finish()
    }
}

/// Walk requirement edges among the unscheduled classifiers until a node
/// repeats; the repeated segment is the cycle, reported as `a -> b -> a`.
fn find_cycle(
    classifiers: &[Box<dyn Classifier>],
    producer: &BTreeMap<Label, usize>,
    in_degree: &[usize],
) -> Vec<Label> {
    let Some(start) = (0..classifiers.len()).find(|&i| in_degree[i] > 0) else {
        return Vec::new();
    };
    let mut path: Vec<usize> = vec![start];
    let mut current = start;
    loop {
        let next = classifiers[current]
            .requires()
            .iter()
            .filter_map(|l| producer.get(l).copied())
            .find(|&j| in_degree[j] > 0);
        let Some(next) = next else {
            return path.iter().map(|&i| classifiers[i].output()).collect();
        };
        if let Some(pos) = path.iter().position(|&i| i == next) {
            let mut chain: Vec<Label> = path[pos..].iter().map(|&i| classifiers[i].output()).collect();
            chain.push(classifiers[next].output());
            // Report in dependency direction: producer first.
            chain.reverse();
            return chain;
        }
        path.push(next);
        current = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::candidate::{Candidate, CandidateDraft, CandidateFailure};
    use crate::classification::classifier::{BuildContext, ClassifierEnv};
    use crate::classification::ClassificationResult;
    use crate::elements::Element;

    struct Stub {
        output: Label,
        requires: Vec<Label>,
    }

    impl Classifier for Stub {
        fn output(&self) -> Label {
            self.output
        }

        fn requires(&self) -> &[Label] {
            &self.requires
        }

        fn score(&self, _: &ClassificationResult, _: &ClassifierEnv<'_>) -> Vec<CandidateDraft> {
            Vec::new()
        }

        fn build(&self, _: &Candidate, _: &mut BuildContext<'_>) -> std::result::Result<Element, CandidateFailure> {
            Err(CandidateFailure::new("stub"))
        }
    }

    fn stub(output: Label, requires: &[Label]) -> Box<dyn Classifier> {
        Box::new(Stub {
            output,
            requires: requires.to_vec(),
        })
    }

    #[test]
    fn test_orders_dependencies_first() {
        let schedule = Schedule::new(vec![
            stub(Label::Part, &[Label::PartCount, Label::PartImage]),
            stub(Label::PartImage, &[]),
            stub(Label::PartCount, &[]),
            stub(Label::PartsList, &[Label::Part]),
        ])
        .unwrap();
        assert_eq!(
            schedule.labels(),
            vec![Label::PartImage, Label::PartCount, Label::Part, Label::PartsList]
        );
        assert!(schedule.get(Label::Part).is_some());
        assert!(schedule.get(Label::Step).is_none());
    }

    #[test]
    fn test_cycle_is_reported_with_chain() {
        let err = Schedule::new(vec![
            stub(Label::PageNumber, &[]),
            stub(Label::Step, &[Label::Diagram]),
            stub(Label::Diagram, &[Label::Arrow]),
            stub(Label::Arrow, &[Label::Step]),
        ])
        .unwrap_err();
        match err {
            Error::DependencyCycle { chain } => {
                assert_eq!(chain.len(), 4);
                assert_eq!(chain.first(), chain.last());
                assert!(chain.contains(&Label::Diagram));
                assert!(!chain.contains(&Label::PageNumber));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_output_is_rejected() {
        let err = Schedule::new(vec![stub(Label::Arrow, &[]), stub(Label::Arrow, &[])]).unwrap_err();
        assert!(matches!(err, Error::DuplicateClassifier(Label::Arrow)));
    }

    #[test]
    fn test_missing_dependency_is_rejected() {
        let err = Schedule::new(vec![stub(Label::Part, &[Label::PartCount])]).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingDependency {
                classifier: Label::Part,
                label: Label::PartCount
            }
        ));
    }
}
