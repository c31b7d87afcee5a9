// ABOUTME: Predicates selecting which container snapshots take part in a session.
// ABOUTME: Combined by build_filter from the name list and label-enable setting.

use super::Container;

/// Pure predicate over a snapshot.
pub type ContainerFilter = Box<dyn Fn(&Container) -> bool + Send + Sync>;

/// Accepts every container.
pub fn no_filter() -> ContainerFilter {
    Box::new(|_| true)
}

/// Accepts containers whose name is in `names`; an empty list accepts all.
pub fn filter_by_names(names: Vec<String>, base: ContainerFilter) -> ContainerFilter {
    if names.is_empty() {
        return base;
    }
    Box::new(move |c| {
        let name = c.name().trim_start_matches('/');
        names.iter().any(|n| n.trim_start_matches('/') == name) && base(c)
    })
}

/// Accepts only containers labelled `reimage.enable=true`.
pub fn filter_by_enable_label(base: ContainerFilter) -> ContainerFilter {
    Box::new(move |c| c.enabled() == Some(true) && base(c))
}

/// Rejects containers labelled `reimage.enable=false`.
pub fn filter_by_disable_label(base: ContainerFilter) -> ContainerFilter {
    Box::new(move |c| c.enabled() != Some(false) && base(c))
}

/// Filter for a session: the name list, the enable label when required, and
/// always the disable label.
pub fn build_filter(names: Vec<String>, label_enable: bool) -> ContainerFilter {
    let mut filter = filter_by_names(names, no_filter());
    if label_enable {
        filter = filter_by_enable_label(filter);
    }
    filter_by_disable_label(filter)
}
