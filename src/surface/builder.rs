use crate::{
    knots::check_knot_vector_with_tolerance,
    surface::{Direction, Parametrization, Stage, Surface, SurfaceError},
    tolerance::Tolerance,
    types::{MatD, VecD},
};

#[derive(Debug, Clone, Default, PartialEq)]
struct DirectionStages {
    p: Option<usize>,
    count: Option<usize>,
    knots: Option<VecD>,
}

/// Assembles a [`Surface`] in the order
///
/// 1. degrees in `u` and `v`,
/// 2. control point counts in `u` and `v`,
/// 3. control points,
/// 4. knot vectors in `u` and `v`.
///
/// Every setter validates its input and fails immediately if a stage it depends on was skipped.
/// Setting a stage again discards all later stages that depend on it, so they must be set anew.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceBuilder {
    u: DirectionStages,
    v: DirectionStages,
    points: Option<MatD>,
    tolerance: Tolerance,
}

fn out_of_order(stage: Stage, missing: Stage) -> SurfaceError {
    log::debug!("rejected {} because the {} is not set", stage, missing);
    SurfaceError::ConstructionOrder { stage, missing }
}

impl SurfaceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn stages(&self, direction: Direction) -> &DirectionStages {
        match direction {
            Direction::U => &self.u,
            Direction::V => &self.v,
        }
    }

    fn stages_mut(&mut self, direction: Direction) -> &mut DirectionStages {
        match direction {
            Direction::U => &mut self.u,
            Direction::V => &mut self.v,
        }
    }

    /// Discards the control points and both knot vectors.
    fn reset_control_points(&mut self) {
        if self.points.take().is_some() {
            log::debug!("discarded the control points and knot vectors");
        }
        self.u.knots = None;
        self.v.knots = None;
    }

    /// Sets the tolerance used to validate knot vectors and to normalize derivatives.
    pub fn tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn degree(mut self, direction: Direction, p: usize) -> Result<Self, SurfaceError> {
        if p < 1 {
            return Err(SurfaceError::DegreeTooLow { direction, p });
        }
        let stages = self.stages_mut(direction);
        stages.p = Some(p);
        stages.count = None;
        self.reset_control_points();
        Ok(self)
    }

    pub fn degree_u(self, p: usize) -> Result<Self, SurfaceError> {
        self.degree(Direction::U, p)
    }

    pub fn degree_v(self, p: usize) -> Result<Self, SurfaceError> {
        self.degree(Direction::V, p)
    }

    /// Sets the number of control points, which must exceed the degree, in one direction.
    pub fn control_point_count(mut self, direction: Direction, count: usize) -> Result<Self, SurfaceError> {
        let stage = Stage::ControlPointCount(direction);
        let p = self.stages(direction).p.ok_or_else(|| out_of_order(stage, Stage::Degree(direction)))?;

        if count < p + 1 {
            return Err(SurfaceError::TooFewControlPoints { direction, p, count, required: p + 1 });
        }
        self.stages_mut(direction).count = Some(count);
        self.reset_control_points();
        Ok(self)
    }

    pub fn control_point_count_u(self, count: usize) -> Result<Self, SurfaceError> {
        self.control_point_count(Direction::U, count)
    }

    pub fn control_point_count_v(self, count: usize) -> Result<Self, SurfaceError> {
        self.control_point_count(Direction::V, count)
    }

    /// Sets the control points as the columns of a `2 x (count_u * count_v)` matrix.
    ///
    /// The control point `P_{i,j}` is stored in column `i * count_v + j`.
    pub fn control_points(mut self, points: MatD) -> Result<Self, SurfaceError> {
        let stage = Stage::ControlPoints;
        for direction in [Direction::U, Direction::V] {
            if self.stages(direction).p.is_none() {
                return Err(out_of_order(stage, Stage::Degree(direction)));
            }
        }

        let mut expected = 1;
        for direction in [Direction::U, Direction::V] {
            let count =
                self.stages(direction).count.ok_or_else(|| out_of_order(stage, Stage::ControlPointCount(direction)))?;
            expected *= count;
        }

        if points.nrows() != 2 {
            return Err(SurfaceError::ControlPointDimension { dimension: points.nrows() });
        }
        if points.ncols() != expected {
            return Err(SurfaceError::ControlPointCount { expected, count: points.ncols() });
        }

        self.points = Some(points);
        Ok(self)
    }

    /// Sets the knot vector of one direction after validating it against the degree and control point count.
    pub fn knots(mut self, direction: Direction, knots: VecD) -> Result<Self, SurfaceError> {
        let stage = Stage::Knots(direction);
        let stages = self.stages(direction);

        let p = stages.p.ok_or_else(|| out_of_order(stage, Stage::Degree(direction)))?;
        let count = stages.count.ok_or_else(|| out_of_order(stage, Stage::ControlPointCount(direction)))?;
        if self.points.is_none() {
            return Err(out_of_order(stage, Stage::ControlPoints));
        }

        if !check_knot_vector_with_tolerance(p, &knots, count, &self.tolerance) {
            return Err(SurfaceError::InvalidKnotVector { direction, p, count });
        }

        self.stages_mut(direction).knots = Some(knots);
        Ok(self)
    }

    pub fn knots_u(self, knots: VecD) -> Result<Self, SurfaceError> {
        self.knots(Direction::U, knots)
    }

    pub fn knots_v(self, knots: VecD) -> Result<Self, SurfaceError> {
        self.knots(Direction::V, knots)
    }

    /// Completes the construction. Fails if any stage is missing or the stages do not fit together.
    pub fn build(self) -> Result<Surface, SurfaceError> {
        let points = self.points.ok_or(SurfaceError::Incomplete(Stage::ControlPoints))?;
        let u = finish(self.u, Direction::U, &self.tolerance)?;
        let v = finish(self.v, Direction::V, &self.tolerance)?;

        let expected = u.count * v.count;
        if points.nrows() != 2 {
            return Err(SurfaceError::ControlPointDimension { dimension: points.nrows() });
        }
        if points.ncols() != expected {
            return Err(SurfaceError::ControlPointCount { expected, count: points.ncols() });
        }

        Ok(Surface::new(u, v, &points, self.tolerance))
    }
}

fn finish(
    stages: DirectionStages,
    direction: Direction,
    tolerance: &Tolerance,
) -> Result<Parametrization, SurfaceError> {
    let p = stages.p.ok_or(SurfaceError::Incomplete(Stage::Degree(direction)))?;
    let count = stages.count.ok_or(SurfaceError::Incomplete(Stage::ControlPointCount(direction)))?;
    let knots = stages.knots.ok_or(SurfaceError::Incomplete(Stage::Knots(direction)))?;

    if !check_knot_vector_with_tolerance(p, &knots, count, tolerance) {
        return Err(SurfaceError::InvalidKnotVector { direction, p, count });
    }

    Ok(Parametrization { p, count, knots })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::dvector;
    use rstest::{fixture, rstest};

    use super::*;
    use crate::{knots::generate_uniform_clamped, surface::tests::grid_points, types::Point2};

    const COUNT: usize = 5;

    #[fixture]
    /// A builder with degrees and control point counts set.
    fn counted() -> SurfaceBuilder {
        SurfaceBuilder::new()
            .degree_u(2)
            .and_then(|b| b.degree_v(2))
            .and_then(|b| b.control_point_count_u(COUNT))
            .and_then(|b| b.control_point_count_v(COUNT))
            .unwrap()
    }

    /// Completes `counted` with a grid of control points and uniform knot vectors.
    fn complete(counted: SurfaceBuilder) -> SurfaceBuilder {
        counted
            .control_points(grid_points(COUNT))
            .and_then(|b| b.knots_u(generate_uniform_clamped(2, COUNT)))
            .and_then(|b| b.knots_v(generate_uniform_clamped(2, COUNT)))
            .unwrap()
    }

    #[rstest]
    fn degree_too_low() {
        assert_eq!(
            SurfaceBuilder::new().degree_v(0),
            Err(SurfaceError::DegreeTooLow { direction: Direction::V, p: 0 })
        );
    }

    #[rstest]
    fn control_point_count_before_degree() {
        assert_eq!(
            SurfaceBuilder::new().control_point_count_u(COUNT),
            Err(SurfaceError::ConstructionOrder {
                stage: Stage::ControlPointCount(Direction::U),
                missing: Stage::Degree(Direction::U),
            })
        );
    }

    #[rstest]
    fn too_few_control_points() {
        assert_eq!(
            SurfaceBuilder::new().degree_u(3).and_then(|b| b.control_point_count_u(3)),
            Err(SurfaceError::TooFewControlPoints { direction: Direction::U, p: 3, count: 3, required: 4 })
        );
    }

    #[rstest]
    #[case(SurfaceBuilder::new().degree_u(2).unwrap(), Direction::V)]
    #[case(SurfaceBuilder::new().degree_v(2).unwrap(), Direction::U)]
    fn control_points_before_degree(#[case] builder: SurfaceBuilder, #[case] missing: Direction) {
        assert_eq!(
            builder.control_points(grid_points(COUNT)),
            Err(SurfaceError::ConstructionOrder { stage: Stage::ControlPoints, missing: Stage::Degree(missing) })
        );
    }

    #[rstest]
    fn control_points_before_count() {
        let builder = SurfaceBuilder::new().degree_u(2).and_then(|b| b.degree_v(2)).unwrap();
        assert_eq!(
            builder.control_points(grid_points(COUNT)),
            Err(SurfaceError::ConstructionOrder {
                stage: Stage::ControlPoints,
                missing: Stage::ControlPointCount(Direction::U),
            })
        );
    }

    #[rstest]
    fn control_points_must_be_planar(counted: SurfaceBuilder) {
        assert_eq!(
            counted.control_points(MatD::zeros(3, COUNT * COUNT)),
            Err(SurfaceError::ControlPointDimension { dimension: 3 })
        );
    }

    #[rstest]
    fn control_points_must_fill_grid(counted: SurfaceBuilder) {
        assert_eq!(
            counted.control_points(grid_points(4)),
            Err(SurfaceError::ControlPointCount { expected: 25, count: 16 })
        );
    }

    #[rstest]
    fn knots_before_control_points(counted: SurfaceBuilder, #[values(Direction::U, Direction::V)] direction: Direction) {
        assert_eq!(
            counted.knots(direction, generate_uniform_clamped(2, COUNT)),
            Err(SurfaceError::ConstructionOrder { stage: Stage::Knots(direction), missing: Stage::ControlPoints })
        );
    }

    #[rstest]
    fn knots_before_degree() {
        assert_eq!(
            SurfaceBuilder::new().knots_u(generate_uniform_clamped(2, COUNT)),
            Err(SurfaceError::ConstructionOrder {
                stage: Stage::Knots(Direction::U),
                missing: Stage::Degree(Direction::U),
            })
        );
    }

    #[rstest]
    #[case(dvector![0., 0., 0., 0.5, 1., 1., 1.])]
    #[case(dvector![0., 0., 0.2, 0.4, 0.6, 0.8, 1., 1.])]
    #[case(dvector![0., 0., 0., 0.6, 0.3, 1., 1., 1.])]
    fn invalid_knots(counted: SurfaceBuilder, #[case] knots: VecD) {
        let builder = counted.control_points(grid_points(COUNT)).unwrap();
        assert_eq!(
            builder.knots_v(knots),
            Err(SurfaceError::InvalidKnotVector { direction: Direction::V, p: 2, count: COUNT })
        );
    }

    #[rstest]
    fn unnormalized_knots_are_accepted(counted: SurfaceBuilder) {
        let knots = dvector![2., 2., 2., 3., 4., 5., 5., 5.];
        let surface = counted
            .control_points(grid_points(COUNT))
            .and_then(|b| b.knots_u(knots.clone()))
            .and_then(|b| b.knots_v(generate_uniform_clamped(2, COUNT)))
            .and_then(|b| b.build())
            .unwrap();
        assert_eq!(surface.knots_u(), &knots);
    }

    #[rstest]
    fn build_requires_all_stages(counted: SurfaceBuilder) {
        assert_eq!(counted.clone().build(), Err(SurfaceError::Incomplete(Stage::ControlPoints)));

        let builder = counted
            .control_points(grid_points(COUNT))
            .and_then(|b| b.knots_u(generate_uniform_clamped(2, COUNT)))
            .unwrap();
        assert_eq!(builder.build(), Err(SurfaceError::Incomplete(Stage::Knots(Direction::V))));
    }

    #[rstest]
    fn tolerance_is_passed_on(counted: SurfaceBuilder) {
        let tolerance = Tolerance::new(1e-3, 1e-6);
        let surface = counted
            .tolerance(tolerance)
            .control_points(grid_points(COUNT))
            .and_then(|b| b.knots_u(generate_uniform_clamped(2, COUNT)))
            .and_then(|b| b.knots_v(generate_uniform_clamped(2, COUNT)))
            .and_then(|b| b.build())
            .unwrap();
        assert_eq!(surface.tolerance(), &tolerance);
    }

    #[rstest]
    fn changing_count_discards_control_points(counted: SurfaceBuilder) {
        let builder = complete(counted).control_point_count_u(6).unwrap();
        assert_eq!(builder.points, None);
        assert_eq!((builder.u.knots.as_ref(), builder.v.knots.as_ref()), (None, None));
        assert_eq!(builder.build(), Err(SurfaceError::Incomplete(Stage::ControlPoints)));
    }

    #[rstest]
    fn changing_degree_discards_dependent_stages(counted: SurfaceBuilder) {
        let builder = complete(counted).degree_u(1).unwrap();
        assert_eq!(builder.u.count, None);
        assert_eq!(builder.v.count, Some(COUNT));
        assert_eq!(builder.clone().build(), Err(SurfaceError::Incomplete(Stage::ControlPoints)));
        assert_eq!(
            builder.clone().control_points(grid_points(COUNT)),
            Err(SurfaceError::ConstructionOrder {
                stage: Stage::ControlPoints,
                missing: Stage::ControlPointCount(Direction::U),
            })
        );

        let surface = builder
            .control_point_count_u(COUNT)
            .and_then(|b| b.control_points(grid_points(COUNT)))
            .and_then(|b| b.knots_u(generate_uniform_clamped(1, COUNT)))
            .and_then(|b| b.knots_v(generate_uniform_clamped(2, COUNT)))
            .and_then(|b| b.build())
            .unwrap();
        assert_eq!(surface.degree_u(), 1);
        assert_relative_eq!(surface.evaluate(0.25, 0.25).unwrap(), Point2::new(1.0, 1.21875), epsilon = 1e-12);
    }

    #[rstest]
    fn replacing_control_points_keeps_knots(counted: SurfaceBuilder) {
        let shifted = grid_points(COUNT).add_scalar(1.0);
        let surface = complete(counted).control_points(shifted.clone()).and_then(|b| b.build()).unwrap();
        assert_eq!(surface.control_points(), shifted);
    }

    #[rstest]
    fn build_rechecks_control_point_count(counted: SurfaceBuilder) {
        let mut builder = complete(counted);
        builder.u.count = Some(6);
        builder.u.knots = Some(generate_uniform_clamped(2, 6));
        assert_eq!(builder.build(), Err(SurfaceError::ControlPointCount { expected: 30, count: 25 }));
    }

    #[rstest]
    fn build_rechecks_knot_vectors(counted: SurfaceBuilder) {
        let mut builder = complete(counted);
        builder.v.p = Some(1);
        assert_eq!(
            builder.build(),
            Err(SurfaceError::InvalidKnotVector { direction: Direction::V, p: 1, count: COUNT })
        );
    }
}
