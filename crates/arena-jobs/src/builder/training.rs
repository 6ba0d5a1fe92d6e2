//! Training job kinds and their options.

use super::{JobBuilder, JobKind};
use crate::field::{COLON, EQUALS};
use crate::types::TrainingJobType;

job_kind!(
    /// TensorFlow distributed training (`arena submit tfjob`).
    TfJob => TrainingJobType::Tf
);
job_kind!(
    /// MPI training (`arena submit mpijob`).
    MpiJob => TrainingJobType::Mpi
);
job_kind!(
    /// PyTorch training (`arena submit pytorchjob`).
    PytorchJob => TrainingJobType::Pytorch
);
job_kind!(
    /// Horovod training (`arena submit horovodjob`).
    HorovodJob => TrainingJobType::Horovod
);
job_kind!(
    /// Elastic training (`arena submit etjob`).
    EtJob => TrainingJobType::Et
);
job_kind!(
    /// Spark job (`arena submit sparkjob`).
    SparkJob => TrainingJobType::Spark
);
job_kind!(
    /// Volcano batch job (`arena submit volcanojob`).
    VolcanoJob => TrainingJobType::Volcano
);
job_kind!(
    /// Worker count change for a running elastic job
    /// (`arena scalein etjob` / `arena scaleout etjob`).
    EtScale => TrainingJobType::Et
);

/// Training kinds sharing the common training option set.
pub trait StandardTraining: JobKind<JobType = TrainingJobType> {}

macro_rules! standard_training {
    ($($name:ident),+) => {
        $(
            impl StandardTraining for $name {}
            option_groups!($name => WithImage, WithEnvs, WithPlacement, WithDataSync,
                WithWorkingDir, WithShell, WithCommand);
        )+
    };
}

standard_training!(TfJob, MpiJob, PytorchJob, HorovodJob, EtJob);

option_groups!(MpiJob => WithResources);
option_groups!(PytorchJob => WithResources);
option_groups!(HorovodJob => WithResources);
option_groups!(EtJob => WithResources);
option_groups!(SparkJob => WithImage, WithReplicas, WithCommand);
option_groups!(VolcanoJob => WithCommand);
option_groups!(EtScale => WithEnvs);

/// Builder for TensorFlow jobs.
pub type TfJobBuilder = JobBuilder<TfJob>;
/// Builder for MPI jobs.
pub type MpiJobBuilder = JobBuilder<MpiJob>;
/// Builder for PyTorch jobs.
pub type PytorchJobBuilder = JobBuilder<PytorchJob>;
/// Builder for Horovod jobs.
pub type HorovodJobBuilder = JobBuilder<HorovodJob>;
/// Builder for elastic training jobs.
pub type EtJobBuilder = JobBuilder<EtJob>;
/// Builder for Spark jobs.
pub type SparkJobBuilder = JobBuilder<SparkJob>;
/// Builder for Volcano jobs.
pub type VolcanoJobBuilder = JobBuilder<VolcanoJob>;
/// Builder for elastic scale-in and scale-out requests.
pub type EtScaleBuilder = JobBuilder<EtScale>;

impl<K: StandardTraining> JobBuilder<K> {
    /// Worker count (`--workers`).
    #[must_use]
    pub fn workers(self, count: u32) -> Self {
        self.number("--workers", count)
    }

    /// Image pull policy, e.g. `Always` (`--image-pull-policy`).
    #[must_use]
    pub fn image_pull_policy(self, policy: impl Into<String>) -> Self {
        self.scalar("--image-pull-policy", policy)
    }

    /// Local files copied into the job (`--config-file=local:container`).
    #[must_use]
    pub fn config_files<I, A, B>(self, files: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.map("--config-file", files, COLON)
    }

    /// Job labels (`--label=K=V`).
    #[must_use]
    pub fn labels<I, A, B>(self, labels: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.map("--label", labels, EQUALS)
    }

    /// Extended device resources (`--device=resource=count`).
    #[must_use]
    pub fn devices<I, A, B>(self, devices: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        self.map("--device", devices, EQUALS)
    }

    /// Training log directory (`--logdir`).
    #[must_use]
    pub fn log_dir(self, dir: impl Into<String>) -> Self {
        self.scalar("--logdir", dir)
    }

    /// Priority class name (`--priority`).
    #[must_use]
    pub fn priority(self, priority: impl Into<String>) -> Self {
        self.scalar("--priority", priority)
    }

    /// Request RDMA devices (`--rdma`).
    #[must_use]
    pub fn enable_rdma(self) -> Self {
        self.switch("--rdma")
    }

    /// Start a TensorBoard next to the job (`--tensorboard`).
    #[must_use]
    pub fn enable_tensorboard(self) -> Self {
        self.switch("--tensorboard")
    }

    /// TensorBoard image (`--tensorboard-image`).
    #[must_use]
    pub fn tensorboard_image(self, image: impl Into<String>) -> Self {
        self.scalar("--tensorboard-image", image)
    }

    /// Retries before the job is marked failed (`--retry`).
    #[must_use]
    pub fn retry_count(self, count: u32) -> Self {
        self.number("--retry", count)
    }

    /// Schedule all instances together (`--gang`).
    #[must_use]
    pub fn enable_coscheduling(self) -> Self {
        self.switch("--gang")
    }
}

/// Options for one TensorFlow role (worker, ps, evaluator or chief).
macro_rules! tf_role_options {
    ($role:literal: $selectors:ident, $memory:ident, $memory_limit:ident, $cpu:ident, $cpu_limit:ident) => {
        #[doc = concat!("Node selectors for ", $role, " instances.")]
        #[must_use]
        pub fn $selectors<I, A, B>(self, selectors: I) -> Self
        where
            I: IntoIterator<Item = (A, B)>,
            A: Into<String>,
            B: Into<String>,
        {
            self.map(concat!("--", $role, "-selector"), selectors, EQUALS)
        }

        #[doc = concat!("Memory request for ", $role, " instances.")]
        #[must_use]
        pub fn $memory(self, memory: impl Into<String>) -> Self {
            self.scalar(concat!("--", $role, "-memory"), memory)
        }

        #[doc = concat!("Memory limit for ", $role, " instances.")]
        #[must_use]
        pub fn $memory_limit(self, memory: impl Into<String>) -> Self {
            self.scalar(concat!("--", $role, "-memory-limit"), memory)
        }

        #[doc = concat!("CPU request for ", $role, " instances.")]
        #[must_use]
        pub fn $cpu(self, cpu: impl Into<String>) -> Self {
            self.scalar(concat!("--", $role, "-cpu"), cpu)
        }

        #[doc = concat!("CPU limit for ", $role, " instances.")]
        #[must_use]
        pub fn $cpu_limit(self, cpu: impl Into<String>) -> Self {
            self.scalar(concat!("--", $role, "-cpu-limit"), cpu)
        }
    };
}

impl JobBuilder<TfJob> {
    tf_role_options!("worker": worker_selectors, worker_memory, worker_memory_limit, worker_cpu, worker_cpu_limit);
    tf_role_options!("ps": ps_selectors, ps_memory, ps_memory_limit, ps_cpu, ps_cpu_limit);
    tf_role_options!("evaluator": evaluator_selectors, evaluator_memory, evaluator_memory_limit, evaluator_cpu, evaluator_cpu_limit);
    tf_role_options!("chief": chief_selectors, chief_memory, chief_memory_limit, chief_cpu, chief_cpu_limit);

    /// Worker port (`--worker-port`).
    #[must_use]
    pub fn worker_port(self, port: u16) -> Self {
        self.number("--worker-port", port)
    }

    /// Worker image, if different from `--image` (`--worker-image`).
    #[must_use]
    pub fn worker_image(self, image: impl Into<String>) -> Self {
        self.scalar("--worker-image", image)
    }

    /// Parameter server count (`--ps`).
    #[must_use]
    pub fn ps_count(self, count: u32) -> Self {
        self.number("--ps", count)
    }

    /// Parameter server port (`--ps-port`).
    #[must_use]
    pub fn ps_port(self, port: u16) -> Self {
        self.number("--ps-port", port)
    }

    /// Parameter server image (`--ps-image`).
    #[must_use]
    pub fn ps_image(self, image: impl Into<String>) -> Self {
        self.scalar("--ps-image", image)
    }

    /// Chief port (`--chief-port`).
    #[must_use]
    pub fn chief_port(self, port: u16) -> Self {
        self.number("--chief-port", port)
    }

    /// Add an evaluator instance (`--evaluator`).
    #[must_use]
    pub fn enable_evaluator(self) -> Self {
        self.switch("--evaluator")
    }

    /// Add a chief instance (`--chief`).
    #[must_use]
    pub fn enable_chief(self) -> Self {
        self.switch("--chief")
    }
}

impl JobBuilder<PytorchJob> {
    /// Which pods to delete when the job ends (`--clean-task-policy`).
    #[must_use]
    pub fn clean_task_policy(self, policy: impl Into<String>) -> Self {
        self.scalar("--clean-task-policy", policy)
    }

    /// Deadline for the running phase, e.g. `5h` (`--running-timeout`).
    #[must_use]
    pub fn running_timeout(self, timeout: impl Into<String>) -> Self {
        self.scalar("--running-timeout", timeout)
    }

    /// How long a finished job is kept, e.g. `1d` (`--ttl-after-finished`).
    #[must_use]
    pub fn ttl_after_finished(self, ttl: impl Into<String>) -> Self {
        self.scalar("--ttl-after-finished", ttl)
    }
}

impl JobBuilder<HorovodJob> {
    /// SSH port used between workers (`--ssh-port`).
    #[must_use]
    pub fn ssh_port(self, port: u16) -> Self {
        self.number("--ssh-port", port)
    }
}

impl JobBuilder<EtJob> {
    /// Lower bound on the worker count (`--min-workers`).
    #[must_use]
    pub fn min_workers(self, count: u32) -> Self {
        self.number("--min-workers", count)
    }

    /// Upper bound on the worker count (`--max-workers`).
    #[must_use]
    pub fn max_workers(self, count: u32) -> Self {
        self.number("--max-workers", count)
    }

    /// Run workers on spot instances (`--spot-instance`).
    #[must_use]
    pub fn enable_spot_instance(self) -> Self {
        self.switch("--spot-instance")
    }

    /// Seconds to wait for spot capacity (`--max-wait-time`).
    #[must_use]
    pub fn max_wait_time(self, seconds: u32) -> Self {
        self.number("--max-wait-time", seconds)
    }
}

impl JobBuilder<SparkJob> {
    /// Main class of the application (`--main-class`).
    #[must_use]
    pub fn main_class(self, class: impl Into<String>) -> Self {
        self.scalar("--main-class", class)
    }

    /// Application jar (`--jar`).
    #[must_use]
    pub fn jar(self, jar: impl Into<String>) -> Self {
        self.scalar("--jar", jar)
    }

    /// Driver CPU request (`--driver-cpu-request`).
    #[must_use]
    pub fn driver_cpu(self, count: u32) -> Self {
        self.number("--driver-cpu-request", count)
    }

    /// Driver memory request, e.g. `500m` (`--driver-memory-request`).
    #[must_use]
    pub fn driver_memory(self, memory: impl Into<String>) -> Self {
        self.scalar("--driver-memory-request", memory)
    }

    /// Executor CPU request (`--executor-cpu-request`).
    #[must_use]
    pub fn executor_cpu(self, count: u32) -> Self {
        self.number("--executor-cpu-request", count)
    }

    /// Executor memory request (`--executor-memory-request`).
    #[must_use]
    pub fn executor_memory(self, memory: impl Into<String>) -> Self {
        self.scalar("--executor-memory-request", memory)
    }
}

impl JobBuilder<VolcanoJob> {
    /// Scheduling queue (`--queue`).
    #[must_use]
    pub fn queue(self, queue: impl Into<String>) -> Self {
        self.scalar("--queue", queue)
    }

    /// Minimum tasks that must be schedulable together (`--min-available`).
    #[must_use]
    pub fn min_available(self, count: u32) -> Self {
        self.number("--min-available", count)
    }

    /// Scheduler name (`--scheduler-name`).
    #[must_use]
    pub fn scheduler_name(self, name: impl Into<String>) -> Self {
        self.scalar("--scheduler-name", name)
    }

    /// Images for the tasks (`--task-images`).
    #[must_use]
    pub fn task_images<I, S>(self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list("--task-images", images)
    }

    /// CPU request per task (`--task-cpu`).
    #[must_use]
    pub fn task_cpu(self, cpu: impl Into<String>) -> Self {
        self.scalar("--task-cpu", cpu)
    }

    /// Memory request per task (`--task-memory`).
    #[must_use]
    pub fn task_memory(self, memory: impl Into<String>) -> Self {
        self.scalar("--task-memory", memory)
    }

    /// Task name prefix (`--task-name`).
    #[must_use]
    pub fn task_name(self, name: impl Into<String>) -> Self {
        self.scalar("--task-name", name)
    }

    /// Task port (`--task-port`).
    #[must_use]
    pub fn task_port(self, port: u16) -> Self {
        self.number("--task-port", port)
    }

    /// Replicas per task (`--task-replicas`).
    #[must_use]
    pub fn task_replicas(self, count: u32) -> Self {
        self.number("--task-replicas", count)
    }
}

impl JobBuilder<EtScale> {
    /// Deadline for the scaling operation, e.g. `10m` (`--timeout`).
    #[must_use]
    pub fn timeout(self, timeout: impl Into<String>) -> Self {
        self.scalar("--timeout", timeout)
    }

    /// Retries for the scaling operation (`--retry`).
    #[must_use]
    pub fn retry(self, count: u32) -> Self {
        self.number("--retry", count)
    }

    /// Workers to add or remove (`--count`).
    #[must_use]
    pub fn count(self, count: u32) -> Self {
        self.number("--count", count)
    }

    /// Script run on each affected worker (`--script`).
    #[must_use]
    pub fn script(self, script: impl Into<String>) -> Self {
        self.scalar("--script", script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tf_roles() {
        let job = TfJobBuilder::new()
            .name("tf-dist")
            .workers(2)
            .ps_count(1)
            .worker_selectors([("role", "worker")])
            .ps_memory("2Gi")
            .chief_cpu_limit("4")
            .enable_chief()
            .enable_evaluator()
            .evaluator_memory_limit("1Gi")
            .worker_port(2222)
            .build()
            .unwrap();

        assert_eq!(job.job_type(), TrainingJobType::Tf);
        assert_eq!(
            job.args(),
            [
                "--name=tf-dist",
                "--workers=2",
                "--ps=1",
                "--worker-selector=role=worker",
                "--ps-memory=2Gi",
                "--chief-cpu-limit=4",
                "--chief",
                "--evaluator",
                "--evaluator-memory-limit=1Gi",
                "--worker-port=2222",
            ]
        );
    }

    #[test]
    fn test_standard_training_options() {
        let job = PytorchJobBuilder::new()
            .config_files([("/tmp/conf.yaml", "/etc/conf.yaml")])
            .labels([("team", "vision")])
            .devices([("aliyun/fpga", "1")])
            .log_dir("/logs")
            .priority("high")
            .enable_rdma()
            .retry_count(3)
            .enable_coscheduling()
            .image_pull_policy("Always")
            .tensorboard_image("tb:latest")
            .working_dir("/root")
            .shell("bash")
            .sync_mode("git")
            .sync_source("https://github.com/kubeflow/arena.git")
            .sync_image("sync:1")
            .clean_task_policy("None")
            .running_timeout("5h")
            .ttl_after_finished("1d")
            .cpu("4")
            .memory("8Gi")
            .build()
            .unwrap();

        assert_eq!(
            job.args(),
            [
                "--config-file=/tmp/conf.yaml:/etc/conf.yaml",
                "--label=team=vision",
                "--device=aliyun/fpga=1",
                "--logdir=/logs",
                "--priority=high",
                "--rdma",
                "--retry=3",
                "--gang",
                "--image-pull-policy=Always",
                "--tensorboard-image=tb:latest",
                "--working-dir=/root",
                "--shell=bash",
                "--sync-mode=git",
                "--sync-source=https://github.com/kubeflow/arena.git",
                "--sync-image=sync:1",
                "--clean-task-policy=None",
                "--running-timeout=5h",
                "--ttl-after-finished=1d",
                "--cpu=4",
                "--memory=8Gi",
            ]
        );
    }

    #[test]
    fn test_horovod_and_et_extras() {
        let horovod = HorovodJobBuilder::new().ssh_port(33).build().unwrap();
        assert_eq!(horovod.args(), ["--ssh-port=33"]);

        let et = EtJobBuilder::new()
            .min_workers(1)
            .max_workers(5)
            .enable_spot_instance()
            .max_wait_time(600)
            .build()
            .unwrap();
        assert_eq!(et.job_type(), TrainingJobType::Et);
        assert_eq!(
            et.args(),
            [
                "--min-workers=1",
                "--max-workers=5",
                "--spot-instance",
                "--max-wait-time=600",
            ]
        );
    }

    #[test]
    fn test_spark_job() {
        let job = SparkJobBuilder::new()
            .name("spark-pi")
            .image("spark:v2.4")
            .replicas(2)
            .main_class("org.apache.spark.examples.SparkPi")
            .jar("local:///opt/spark/examples/jars/spark-examples.jar")
            .driver_cpu(1)
            .driver_memory("500m")
            .executor_cpu(1)
            .executor_memory("500m")
            .build()
            .unwrap();

        assert_eq!(job.job_type(), TrainingJobType::Spark);
        assert_eq!(job.args().len(), 9);
        assert_eq!(job.args()[2], "--replicas=2");
        assert_eq!(job.args()[6], "--driver-memory-request=500m");
    }

    #[test]
    fn test_volcano_job() {
        let job = VolcanoJobBuilder::new()
            .name("vj")
            .queue("default")
            .min_available(1)
            .scheduler_name("volcano")
            .task_images(["busybox", "ubuntu"])
            .task_cpu("250m")
            .task_memory("128Mi")
            .task_name("task")
            .task_port(2222)
            .task_replicas(2)
            .build()
            .unwrap();

        assert_eq!(job.job_type(), TrainingJobType::Volcano);
        assert_eq!(
            &job.args()[4..6],
            ["--task-images=busybox", "--task-images=ubuntu"]
        );
        assert_eq!(job.args().last().map(String::as_str), Some("--task-replicas=2"));
    }

    #[test]
    fn test_et_scale_request() {
        let job = EtScaleBuilder::new()
            .name("elastic-training")
            .timeout("10m")
            .retry(2)
            .count(1)
            .script("/etc/edl/scale.sh")
            .envs([("ACTION", "scaleout")])
            .build()
            .unwrap();

        assert_eq!(job.job_type(), TrainingJobType::Et);
        assert_eq!(
            job.args(),
            [
                "--name=elastic-training",
                "--timeout=10m",
                "--retry=2",
                "--count=1",
                "--script=/etc/edl/scale.sh",
                "--env=ACTION=scaleout",
            ]
        );
        assert_eq!(job.trailing_command(), None);
    }
}
