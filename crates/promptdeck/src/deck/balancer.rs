//! Category-interleaving shuffle.
//!
//! Questions are bucketed by category and each bucket is shuffled. Output is then produced in
//! rounds: every round visits the categories in a fresh random order and takes the next
//! question from each bucket that still has one. Small categories run dry first, after which
//! the remaining large ones fill the tail.

use std::collections::VecDeque;

use rand::Rng;
use rand::seq::SliceRandom;

use super::Question;

/// Return a category-balanced permutation of `questions`.
pub fn balance<R: Rng + ?Sized>(questions: Vec<Question>, rng: &mut R) -> Vec<Question> {
    let total = questions.len();
    let mut buckets: Vec<(String, Vec<Question>)> = Vec::new();
    for q in questions {
        match buckets.iter_mut().find(|(cat, _)| *cat == q.category) {
            Some((_, bucket)) => bucket.push(q),
            None => buckets.push((q.category.clone(), vec![q])),
        }
    }

    let mut queues: Vec<VecDeque<Question>> = buckets
        .into_iter()
        .map(|(_, mut bucket)| {
            bucket.shuffle(rng);
            VecDeque::from(bucket)
        })
        .collect();

    let mut order: Vec<usize> = (0..queues.len()).collect();
    let mut result = Vec::with_capacity(total);
    while result.len() < total {
        order.shuffle(rng);
        for &i in &order {
            if let Some(q) = queues[i].pop_front() {
                result.push(q);
            }
        }
    }
    result
}

/// Length of the longest run of consecutive questions sharing a category.
pub fn longest_category_run(questions: &[Question]) -> usize {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<&str> = None;
    for q in questions {
        if prev == Some(q.category.as_str()) {
            run += 1;
        } else {
            run = 1;
            prev = Some(q.category.as_str());
        }
        longest = longest.max(run);
    }
    longest
}
