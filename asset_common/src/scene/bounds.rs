use ultraviolet::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn expand(&mut self, point: Vec3) {
        self.min = self.min.min_by_component(point);
        self.max = self.max.max_by_component(point);
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Length of the longest side.
    pub fn largest_dimension(&self) -> f32 {
        self.size().component_max()
    }

    /// Grows `bounds` to include `point`, starting a new box if there is none yet.
    pub fn extend(bounds: Option<Self>, point: Vec3) -> Option<Self> {
        match bounds {
            Some(mut bounds) => {
                bounds.expand(point);
                Some(bounds)
            }
            None => Some(Self::from_point(point)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_to_cover_points() {
        let mut bounds = None;
        for point in [
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-1.0, 3.0, 0.5),
            Vec3::new(0.0, 0.0, -0.5),
        ] {
            bounds = BoundingBox::extend(bounds, point);
        }
        let bounds = bounds.unwrap();

        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -0.5));
        assert_eq!(bounds.max, Vec3::new(1.0, 3.0, 0.5));
        assert_eq!(bounds.largest_dimension(), 5.0);
        assert_eq!(bounds.center(), Vec3::new(0.0, 0.5, 0.0));
    }
}
