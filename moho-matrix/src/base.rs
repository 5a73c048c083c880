/// Shape queries shared by matrix types.
pub trait MatTrait {
    fn shape(&self) -> (usize, usize);
    fn nrows(&self) -> usize { self.shape().0 }
    fn ncols(&self) -> usize { self.shape().1 }
    fn is_square(&self) -> bool {
        let (m, n) = self.shape();
        m == n
    }
    fn has_no_entries(&self) -> bool {
        let (m, n) = self.shape();
        m == 0 || n == 0
    }
}
