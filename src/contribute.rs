//! The payload contract aggregated by [`AvlTree::recommend`](crate::AvlTree::recommend).

/// A value that may contribute a sequence of items to a recommendation.
///
/// The tree never inspects its values otherwise. A value either contributes
/// nothing (`None`) or a slice of items, which `recommend` concatenates across
/// a whole subtree.
pub trait Contribute {
    type Item;

    fn contribution(&self) -> Option<&[Self::Item]>;
}

impl<T> Contribute for Vec<T> {
    type Item = T;

    #[inline]
    fn contribution(&self) -> Option<&[T]> {
        Some(self.as_slice())
    }
}

/// An absent value contributes nothing.
impl<C: Contribute> Contribute for Option<C> {
    type Item = C::Item;

    #[inline]
    fn contribution(&self) -> Option<&[C::Item]> {
        self.as_ref().and_then(Contribute::contribution)
    }
}
