use swingcut_common::config::SwingTrackerConfig;
use swingcut_pose_model::frame::FrameSize;
use swingcut_pose_model::keypoints::{BodyJoint, Keypoint, KeypointLayout, PoseKeypoints};
use swingcut_pose_model::sample::PoseSample;
use swingcut_pose_model::time::{Segment, TimeWindow};
use swingcut_swing_core::segment_merge::SegmentMerger;
use swingcut_swing_core::swing_tracker::{SwingStateTracker, TrackerPhase};

/// Backswing rising to a top at 1000ms, then a downswing from y=0.30 into
/// the hip band (mid hip 0.55, band [0.45, 0.65]) at 1300ms.
const SINGLE_SWING: &[(u64, f32)] = &[
    (600, 0.36),
    (700, 0.34),
    (800, 0.32),
    (900, 0.30),
    (1_000, 0.26),
    (1_100, 0.28),
    (1_200, 0.30),
    (1_300, 0.55),
    (1_400, 0.70),
];

/// The single swing followed by a second one whose top is at 1700ms and
/// impact at 2000ms.
const DOUBLE_SWING: &[(u64, f32)] = &[
    (600, 0.36),
    (700, 0.34),
    (800, 0.32),
    (900, 0.30),
    (1_000, 0.26),
    (1_100, 0.28),
    (1_200, 0.30),
    (1_300, 0.55),
    (1_400, 0.50),
    (1_500, 0.40),
    (1_600, 0.34),
    (1_700, 0.30),
    (1_800, 0.33),
    (1_900, 0.36),
    (2_000, 0.55),
];

fn pose(wrist_x: f32, wrist_y: f32) -> PoseKeypoints {
    let layout = KeypointLayout::MediaPipe33;
    let mut kp = PoseKeypoints::new(
        layout,
        vec![Keypoint::new(0.5, 0.5); layout.keypoint_count()],
    );
    kp.set(BodyJoint::LeftShoulder, Keypoint::new(0.42, 0.30));
    kp.set(BodyJoint::RightShoulder, Keypoint::new(0.56, 0.31));
    kp.set(BodyJoint::LeftHip, Keypoint::new(0.45, 0.54));
    kp.set(BodyJoint::RightHip, Keypoint::new(0.53, 0.56));
    kp.set(BodyJoint::LeftWrist, Keypoint::new(wrist_x - 0.02, wrist_y));
    kp.set(BodyJoint::RightWrist, Keypoint::new(wrist_x, wrist_y));
    kp
}

fn samples(track: &[(u64, f32)], mirror: bool) -> Vec<PoseSample> {
    track
        .iter()
        .map(|(t, y)| {
            // the wrist swings across the body as it rises and falls
            let kp = pose(0.3 + y * 0.5, *y);
            let kp = if mirror { kp.flipped_horizontally() } else { kp };
            PoseSample::new(*t, kp)
        })
        .collect()
}

fn run(config: &SwingTrackerConfig, track: &[(u64, f32)]) -> Vec<Segment> {
    let mut tracker = SwingStateTracker::new(
        config,
        TimeWindow::new(0, 5_000).unwrap(),
        FrameSize::new(1920, 1080),
    );
    samples(track, false)
        .iter()
        .filter_map(|s| tracker.step(s))
        .collect()
}

#[test]
fn scenario_single_swing_emits_padded_segment() {
    let mut tracker = SwingStateTracker::new(
        &SwingTrackerConfig::default(),
        TimeWindow::new(0, 5_000).unwrap(),
        FrameSize::new(1920, 1080),
    );

    let mut emitted = vec![];
    for sample in samples(SINGLE_SWING, false) {
        if let Some(segment) = tracker.step(&sample) {
            emitted.push((sample.timestamp_ms, segment));
        }
        if sample.timestamp_ms == 1_200 {
            assert_eq!(tracker.last_top_ms(), Some(1_000));
            assert_eq!(tracker.phase(1_200), TrackerPhase::TopSeen);
        }
    }

    assert_eq!(emitted, vec![(1_300, Segment::new(300, 3_500).unwrap())]);
    assert_eq!(tracker.phase(1_300), TrackerPhase::Cooldown);
    assert_eq!(tracker.phase(2_200), TrackerPhase::TopSeen);
    assert_eq!(tracker.phase(2_500), TrackerPhase::AwaitingTop);
}

#[test]
fn segment_is_clamped_to_window() {
    let mut tracker = SwingStateTracker::new(
        &SwingTrackerConfig::default(),
        TimeWindow::new(500, 2_000).unwrap(),
        FrameSize::new(1920, 1080),
    );
    let segments: Vec<_> = samples(SINGLE_SWING, false)
        .iter()
        .filter_map(|s| tracker.step(s))
        .collect();
    assert_eq!(segments, vec![Segment::new(500, 2_000).unwrap()]);
}

#[test]
fn impact_requires_expired_cooldown() {
    let relaxed = SwingTrackerConfig {
        cooldown_ms: 500,
        ..Default::default()
    };
    assert_eq!(
        run(&relaxed, DOUBLE_SWING),
        vec![
            Segment::new(300, 3_500).unwrap(),
            Segment::new(1_000, 4_200).unwrap(),
        ]
    );

    // default cooldown of 900ms still covers the second impact at 2000ms
    assert_eq!(
        run(&SwingTrackerConfig::default(), DOUBLE_SWING),
        vec![Segment::new(300, 3_500).unwrap()]
    );
}

#[test]
fn impact_requires_recent_top() {
    assert_eq!(run(&SwingTrackerConfig::default(), SINGLE_SWING).len(), 1);

    // the top is 300ms before impact: outside [400, 1400]
    let too_soon = SwingTrackerConfig {
        recent_top_min_ms: 400,
        ..Default::default()
    };
    assert!(run(&too_soon, SINGLE_SWING).is_empty());

    // outside [120, 250]
    let too_late = SwingTrackerConfig {
        recent_top_max_ms: 250,
        ..Default::default()
    };
    assert!(run(&too_late, SINGLE_SWING).is_empty());
}

#[test]
fn impact_requires_hip_band_crossing() {
    // same downswing, but the wrist overshoots the band
    let mut overshoot = SINGLE_SWING.to_vec();
    overshoot[7] = (1_300, 0.70);
    assert!(run(&SwingTrackerConfig::default(), &overshoot).is_empty());

    // the downswing starts inside the band
    let mut from_inside = SINGLE_SWING.to_vec();
    from_inside[6] = (1_200, 0.46);
    assert!(run(&SwingTrackerConfig::default(), &from_inside).is_empty());
}

#[test]
fn impact_requires_downward_speed() {
    let slow = SwingTrackerConfig {
        min_down_speed_px: 1_000_000.0,
        ..Default::default()
    };
    assert!(run(&slow, SINGLE_SWING).is_empty());

    let proportional = SwingTrackerConfig {
        down_speed_long_edge_ratio: 100.0,
        ..Default::default()
    };
    assert!(run(&proportional, SINGLE_SWING).is_empty());
}

#[test]
fn cooldown_deduplicates_triggers_500ms_apart() {
    let track: &[(u64, f32)] = &[
        (600, 0.36),
        (700, 0.34),
        (800, 0.32),
        (900, 0.30),
        (1_000, 0.26),
        (1_100, 0.28),
        (1_200, 0.30),
        (1_300, 0.55),
        (1_400, 0.40),
        (1_500, 0.30),
        (1_600, 0.32),
        (1_700, 0.35),
        (1_800, 0.55),
    ];

    let default = run(&SwingTrackerConfig::default(), track);
    assert_eq!(default, vec![Segment::new(300, 3_500).unwrap()]);

    // the second trigger is valid on its own
    let short = SwingTrackerConfig {
        cooldown_ms: 400,
        ..Default::default()
    };
    assert_eq!(run(&short, track).len(), 2);
}

#[test]
fn mirrored_trajectory_yields_same_segments() {
    let config = SwingTrackerConfig::default();
    let window = TimeWindow::new(0, 5_000).unwrap();
    let size = FrameSize::new(1080, 1920);

    let mut plain = SwingStateTracker::new(&config, window, size);
    let mut mirrored = SwingStateTracker::new(&config, window, size);

    let plain_out: Vec<_> = samples(DOUBLE_SWING, false)
        .iter()
        .filter_map(|s| plain.step(s))
        .collect();
    let mirrored_samples = samples(DOUBLE_SWING, true);
    assert!(mirrored_samples.iter().all(|s| s.mirrored));
    let mirrored_out: Vec<_> = mirrored_samples
        .iter()
        .filter_map(|s| mirrored.step(s))
        .collect();

    assert!(!plain_out.is_empty());
    assert_eq!(plain_out, mirrored_out);
    assert_eq!(plain.mirrored(), Some(false));
    assert_eq!(mirrored.mirrored(), Some(true));
}

#[test]
fn invalid_sample_does_not_disturb_detection() {
    let mut tracker = SwingStateTracker::new(
        &SwingTrackerConfig::default(),
        TimeWindow::new(0, 5_000).unwrap(),
        FrameSize::new(1920, 1080),
    );

    let mut emitted = vec![];
    for sample in samples(SINGLE_SWING, false) {
        if sample.timestamp_ms == 1_300 {
            // would block the 1300 sample by the step rule if it were accepted
            let mut broken = pose(0.4, 0.5);
            broken.set(BodyJoint::RightHip, Keypoint::new(0.5, f32::NAN));
            assert_eq!(tracker.step(&PoseSample::new(1_250, broken)), None);
            assert_eq!(tracker.observe(1_260, None), None);
        }
        emitted.extend(tracker.step(&sample));
    }

    assert_eq!(emitted, vec![Segment::new(300, 3_500).unwrap()]);
}

#[test]
fn windows_merge_into_disjoint_segments() {
    let config = SwingTrackerConfig::default();
    let size = FrameSize::new(1920, 1080);
    let mut merger = SegmentMerger::new(150);

    // the same swing seen by two overlapping windows
    for window in [TimeWindow::new(0, 3_000).unwrap(), TimeWindow::new(200, 5_000).unwrap()] {
        let mut tracker = SwingStateTracker::new(&config, window, size);
        for sample in samples(SINGLE_SWING, false) {
            if let Some(segment) = tracker.step(&sample) {
                merger.append(segment);
            }
        }
    }

    assert_eq!(merger.appended(), 2);
    assert_eq!(merger.finish(), vec![Segment::new(300, 3_500).unwrap()]);
}
