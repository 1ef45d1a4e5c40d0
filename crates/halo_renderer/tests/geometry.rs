//! Grid, CSG and instancing checked against direct intersection.

use halo_math::{AffineTransform, Color, Interval, Ray, Vec3, K_EPSILON};
use halo_renderer::geometry::{AxisAlignedBox, Csg, Instance, Sphere, Triangle};
use halo_renderer::material::Matte;
use halo_renderer::{GeometricObject, Grid, GridBuilder, HitRecord, Material, ObjectRef};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn full_range() -> Interval {
    Interval::new(K_EPSILON, f32::INFINITY)
}

fn random_vec(rng: &mut StdRng, lo: f32, hi: f32) -> Vec3 {
    Vec3::new(rng.gen_range(lo..hi), rng.gen_range(lo..hi), rng.gen_range(lo..hi))
}

/// Distinct material per object so a hit names the object it came from.
fn tagged(i: usize) -> Arc<dyn Material> {
    Arc::new(Matte::new(0.0, 1.0, Color::splat(i as f32 / 100.0)))
}

fn random_scene(rng: &mut StdRng) -> Vec<ObjectRef> {
    let mut objects: Vec<ObjectRef> = Vec::new();
    for i in 0..40 {
        let sphere = Sphere::new(random_vec(rng, -10.0, 10.0), rng.gen_range(0.2..1.5));
        objects.push(Arc::new(sphere.with_material(tagged(i))));
    }
    for i in 40..60 {
        let min = random_vec(rng, -10.0, 9.0);
        let cube = AxisAlignedBox::new(min, min + random_vec(rng, 0.1, 1.0));
        objects.push(Arc::new(cube.with_material(tagged(i))));
    }
    for i in 60..80 {
        let v0 = random_vec(rng, -10.0, 10.0);
        let triangle = Triangle::new(
            v0,
            v0 + random_vec(rng, -2.0, 2.0),
            v0 + random_vec(rng, -2.0, 2.0),
        );
        objects.push(Arc::new(triangle.with_material(tagged(i))));
    }
    objects
}

/// Objects that share faces or occupy the same space.
fn touching_scene() -> Vec<ObjectRef> {
    let mut objects: Vec<ObjectRef> = Vec::new();
    // A row of unit cubes, each sharing a face with the next
    for i in 0..4 {
        let min = Vec3::new(i as f32, 0.0, 0.0);
        let cube = AxisAlignedBox::new(min, min + Vec3::ONE);
        objects.push(Arc::new(cube.with_material(tagged(i))));
    }
    // Two copies of one sphere and a third sphere touching them
    let centre = Vec3::new(1.5, 2.5, 0.5);
    objects.push(Arc::new(Sphere::new(centre, 0.5).with_material(tagged(4))));
    objects.push(Arc::new(Sphere::new(centre, 0.5).with_material(tagged(5))));
    objects.push(Arc::new(Sphere::new(centre + Vec3::X, 0.5).with_material(tagged(6))));
    // Lying in the cubes' top faces
    let lid = Triangle::new(
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(4.0, 1.0, 0.0),
        Vec3::new(0.0, 1.0, 1.0),
    );
    objects.push(Arc::new(lid.with_material(tagged(7))));
    objects
}

fn build_grid(objects: &[ObjectRef]) -> Grid {
    let mut builder = GridBuilder::new();
    for object in objects {
        builder.add_object(object.clone());
    }
    builder.build()
}

/// Every object hit along `ray`, nearest first.
fn all_hits<'a>(objects: &'a [ObjectRef], ray: &Ray) -> Vec<HitRecord<'a>> {
    let mut hits: Vec<HitRecord<'a>> = objects
        .iter()
        .filter_map(|object| {
            let mut rec = HitRecord::default();
            object.hit(ray, full_range(), &mut rec).then_some(rec)
        })
        .collect();
    hits.sort_by(|a, b| a.t.total_cmp(&b.t));
    hits
}

fn brute_force(objects: &[ObjectRef], ray: &Ray) -> Option<f32> {
    all_hits(objects, ray).first().map(|rec| rec.t)
}

fn material_addr(rec: &HitRecord) -> Option<*const ()> {
    rec.material.map(|m| m as *const _ as *const ())
}

/// The grid's nearest hit is the brute-force nearest hit, down to which
/// object produced it.
fn assert_grid_agrees(objects: &[ObjectRef], grid: &Grid, ray: &Ray) {
    let hits = all_hits(objects, ray);
    let mut rec = HitRecord::default();
    let found = grid.hit(ray, full_range(), &mut rec);

    let Some(nearest) = hits.first() else {
        assert!(!found, "{ray:?}: grid hit {rec:?}, brute force missed");
        return;
    };
    assert!(found, "{ray:?}: grid missed {nearest:?}");
    assert!((rec.t - nearest.t).abs() < 1e-4, "{ray:?}: {rec:?} vs {nearest:?}");
    assert!((rec.hit_point - nearest.hit_point).length() < 1e-3, "{ray:?}");

    // Objects tied for nearest may resolve either way
    let mut tied = hits.iter().take_while(|h| h.t - nearest.t < 1e-4);
    assert!(
        tied.any(|h| {
            material_addr(h) == material_addr(&rec) && (h.normal - rec.normal).length() < 1e-4
        }),
        "{ray:?}: grid hit {rec:?}, not one of the nearest objects"
    );
}

#[test]
fn grid_matches_brute_force() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..5 {
        let objects = random_scene(&mut rng);
        let grid = build_grid(&objects);
        assert_eq!(grid.len(), objects.len());

        for _ in 0..500 {
            // Start both inside and outside the grid bounds
            let origin = random_vec(&mut rng, -15.0, 15.0);
            let direction = random_vec(&mut rng, -1.0, 1.0).normalize_or_zero();
            if direction == Vec3::ZERO {
                continue;
            }
            assert_grid_agrees(&objects, &grid, &Ray::new(origin, direction));
        }
    }
}

#[test]
fn grid_matches_brute_force_on_touching_objects() {
    let mut rng = StdRng::seed_from_u64(7);
    let objects = touching_scene();
    let grid = build_grid(&objects);

    for _ in 0..1000 {
        let origin = random_vec(&mut rng, -3.0, 7.0);
        let target = Vec3::new(
            rng.gen_range(0.0..4.0),
            rng.gen_range(0.0..3.0),
            rng.gen_range(0.0..1.0),
        );
        let Some(direction) = (target - origin).try_normalize() else {
            continue;
        };
        assert_grid_agrees(&objects, &grid, &Ray::new(origin, direction));
    }

    // Straight down the row, through every shared face
    let along_row = Ray::new(Vec3::new(-2.0, 0.5, 0.5), Vec3::X);
    assert_grid_agrees(&objects, &grid, &along_row);
    let mut rec = HitRecord::default();
    assert!(grid.hit(&along_row, full_range(), &mut rec));
    assert!((rec.t - 2.0).abs() < 1e-4);
    assert_eq!(material_addr(&rec), material_addr(&all_hits(&objects[..1], &along_row)[0]));
}

#[test]
fn grid_shadow_hits_agree_with_hits() {
    let mut rng = StdRng::seed_from_u64(42);
    let objects = random_scene(&mut rng);
    let grid = build_grid(&objects);

    for _ in 0..200 {
        let ray = Ray::new(
            random_vec(&mut rng, -15.0, 15.0),
            random_vec(&mut rng, -1.0, 1.0).try_normalize().unwrap_or(Vec3::X),
        );
        let window = Interval::new(K_EPSILON, 8.0);
        let hit = brute_force(&objects, &ray).filter(|&t| t < 8.0);
        assert_eq!(grid.shadow_hit(&ray, window).is_some(), hit.is_some());
    }
}

fn unit_sphere_at(x: f32) -> ObjectRef {
    Arc::new(Sphere::new(Vec3::new(x, 0.0, 0.0), 1.0))
}

fn entry_t(object: &dyn GeometricObject, ray: &Ray) -> Option<f32> {
    let mut rec = HitRecord::default();
    object.hit(ray, full_range(), &mut rec).then_some(rec.t)
}

#[test]
fn csg_intervals_along_the_axis() {
    // Spheres over [-1.5, 0.5] and [-0.5, 1.5] on the x axis
    let left = unit_sphere_at(-0.5);
    let right = unit_sphere_at(0.5);
    let through_both = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);

    let union = Csg::union(left.clone(), right.clone()).unwrap();
    let intersection = Csg::intersection(left.clone(), right.clone()).unwrap();
    let difference = Csg::difference(left.clone(), right.clone()).unwrap();

    let ts = |csg: &Csg| -> Vec<f32> {
        csg.intersections(&through_both).iter().map(|c| c.hit.t).collect()
    };
    let close = |a: &[f32], b: &[f32]| {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    };

    assert!(close(&ts(&union), &[3.5, 6.5]));
    assert!(close(&ts(&intersection), &[4.5, 5.5]));
    assert!(close(&ts(&difference), &[3.5, 4.5]));

    // Nearest hits follow the same intervals
    assert!((entry_t(&intersection, &through_both).unwrap() - 4.5).abs() < 1e-4);
    assert!((entry_t(&difference, &through_both).unwrap() - 3.5).abs() < 1e-4);
    // Leaving the left sphere where the right one starts: normal faces +x
    let mut exit = HitRecord::default();
    assert!(difference.hit(&through_both, Interval::new(4.0, f32::INFINITY), &mut exit));
    assert!((exit.t - 4.5).abs() < 1e-4);
    assert!(exit.normal.x > 0.9);

    // Through only the left sphere: intersection misses, difference hits
    let through_left = Ray::new(Vec3::new(-1.2, 5.0, 0.0), -Vec3::Y);
    assert!(entry_t(&intersection, &through_left).is_none());
    assert!(entry_t(&difference, &through_left).is_some());
    assert!(entry_t(&union, &through_left).is_some());

    // Through neither
    let miss = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
    assert!(entry_t(&union, &miss).is_none());
    assert!(union.intersections(&miss).is_empty());
}

#[test]
fn csg_rejects_non_solids() {
    let triangle: ObjectRef = Arc::new(Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y));
    assert!(Csg::union(unit_sphere_at(0.0), triangle).is_err());
}

#[test]
fn scaled_instance_hits_and_normals() {
    // Unit sphere stretched to an ellipsoid with semi-axes (2, 1, 1)
    let sphere: ObjectRef = Arc::new(Sphere::new(Vec3::ZERO, 1.0));
    let ellipsoid =
        Instance::with_transform(sphere, AffineTransform::scaling(Vec3::new(2.0, 1.0, 1.0)));

    let along_x = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
    let mut rec = HitRecord::default();
    assert!(ellipsoid.hit(&along_x, full_range(), &mut rec));
    assert!((rec.t - 3.0).abs() < 1e-4);
    assert!((rec.normal - (-Vec3::X)).length() < 1e-4);

    // Off-axis point (1, 0.5, sqrt 0.5) has gradient (x/4, y, z)
    let p = Vec3::new(1.0, 0.5, 0.5f32.sqrt());
    let ray = Ray::new(Vec3::new(p.x, p.y, 5.0), -Vec3::Z);
    let mut rec = HitRecord::default();
    assert!(ellipsoid.hit(&ray, full_range(), &mut rec));
    let expected = Vec3::new(p.x / 4.0, p.y, p.z).normalize();
    assert!((rec.hit_point - p).length() < 1e-3);
    assert!((rec.normal - expected).length() < 1e-3);

    let bounds = ellipsoid.bounding_box().unwrap();
    assert!(bounds.max().x >= 2.0 && bounds.max().y < 1.5);
}
