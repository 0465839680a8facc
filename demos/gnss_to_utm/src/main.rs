use argh::FromArgs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use glam::DVec3;
use nalgebra::Vector3;
use navfuse::common::{gnss::Gnss, imu::Imu, timer::Timer};
use navfuse::geodesy::{
    gnss::{convert_gnss_to_utm, GnssExtrinsics},
    utm::latlon_to_utm,
};
use navfuse::lie::interpolation::{interpolate, DEFAULT_TIME_TOLERANCE};
use navfuse::linalg::stats;

#[derive(FromArgs)]
/// Convert the GNSS fixes of a sensor log to vehicle poses in a local UTM map frame
struct Args {
    /// path to the sensor log
    #[argh(option, short = 'i')]
    input: PathBuf,

    /// JSON file with the antenna extrinsics
    #[argh(option)]
    extrinsics: Option<PathBuf>,

    /// write the poses as `t x y z qx qy qz qw` lines
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,

    /// write the timing records to this file
    #[argh(option)]
    timing: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let extrinsics: GnssExtrinsics = match &args.extrinsics {
        Some(path) => serde_json::from_reader(File::open(path)?)?,
        None => GnssExtrinsics::default(),
    };
    log::info!("antenna extrinsics: {extrinsics:?}");

    let mut timer = Timer::new();

    // read the log
    let mut imus: Vec<Imu> = vec![];
    let mut fixes: Vec<Gnss> = vec![];
    let summary = timer.evaluate("read log", || {
        navfuse::io::txt::TxtIo::open(&args.input)?
            .set_imu_process_func(|imu| imus.push(*imu))
            .set_gnss_process_func(|gnss| fixes.push(gnss.clone()))
            .go()
    })?;
    log::info!("{summary:?}");

    // the first fix that projects anchors the map frame
    let origin = fixes
        .iter()
        .find_map(|fix| latlon_to_utm(fix.lat_lon_alt.truncate()).ok().map(|utm| (fix, utm)))
        .map(|(fix, utm)| utm.xy.extend(fix.lat_lon_alt.z));
    let Some(origin) = origin else {
        log::warn!("no GNSS fix inside the UTM domain");
        return Ok(());
    };
    log::info!("map origin: {origin}");

    let mut rejected = 0;
    timer.evaluate("convert gnss", || {
        for fix in fixes.iter_mut() {
            if let Err(e) = convert_gnss_to_utm(fix, &extrinsics, origin) {
                log::warn!("fix at {} rejected: {e}", fix.timestamp);
                rejected += 1;
            }
        }
    });
    fixes.retain(|fix| fix.pose_valid());
    log::info!("{} poses, {} fixes rejected", fixes.len(), rejected);

    // static bias estimate over the IMU samples
    if imus.len() >= 2 {
        let (gyro_mean, gyro_cov) =
            stats::compute_mean_and_cov(&imus, |imu| to_vector(imu.gyro))?;
        let (acce_mean, acce_var) =
            stats::compute_mean_and_cov_diag(&imus, |imu| to_vector(imu.acce))?;
        log::info!("gyro mean: {gyro_mean:?}, cov diagonal: {:?}", gyro_cov.diagonal());
        log::info!("acce mean: {acce_mean:?}, var: {acce_var:?}");
    }

    // body poses at IMU rate
    let covered = timer.evaluate("interpolate", || {
        imus.iter()
            .filter(|imu| {
                interpolate(
                    imu.timestamp,
                    &fixes,
                    |fix| fix.timestamp,
                    |fix| fix.utm_pose.unwrap_or_default(),
                    DEFAULT_TIME_TOLERANCE,
                )
                .is_ok()
            })
            .count()
    });
    log::info!("{covered} of {} IMU samples covered by GNSS poses", imus.len());

    if let Some(path) = &args.output {
        let mut writer = BufWriter::new(File::create(path)?);
        for fix in &fixes {
            let Some(pose) = fix.utm_pose else { continue };
            let (t, q) = (pose.translation, pose.rotation.q);
            writeln!(
                writer,
                "{} {} {} {} {} {} {} {}",
                fix.timestamp, t.x, t.y, t.z, q.x, q.y, q.z, q.w
            )?;
        }
        writer.flush()?;
        log::info!("poses written to {}", path.display());
    }

    timer.print_all();
    if let Some(path) = &args.timing {
        timer.dump_into_file(path)?;
    }

    Ok(())
}

fn to_vector(v: DVec3) -> Vector3<f64> {
    Vector3::new(v.x, v.y, v.z)
}
