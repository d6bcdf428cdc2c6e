use alloc::boxed::Box;
use core::{future::Future, pin::Pin};

pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Async counterpart of [`crate::service::Service`]: the call itself returns
/// a future, so a rule may suspend without occupying a worker thread.
pub(crate) trait AsyncService<Request: ?Sized> {
    type Response;
    type Error;

    fn call(&mut self, request: Request) -> BoxFuture<Result<Self::Response, Self::Error>>;
}

pub(crate) trait CloneAsyncService<Request: ?Sized>: AsyncService<Request> {
    #[must_use]
    fn clone_box(&self) -> Box<dyn CloneAsyncService<Request, Response = Self::Response, Error = Self::Error> + Send + Sync>;
}

impl<Request, T> CloneAsyncService<Request> for T
where
    Request: ?Sized,
    T: AsyncService<Request> + Clone + Send + Sync + 'static,
{
    #[inline]
    fn clone_box(&self) -> Box<dyn CloneAsyncService<Request, Response = T::Response, Error = T::Error> + Send + Sync> {
        Box::new(self.clone())
    }
}

pub(crate) struct BoxCloneAsyncService<Request: ?Sized, Response, Error>(
    pub(crate) Box<dyn CloneAsyncService<Request, Response = Response, Error = Error> + Send + Sync>,
);

impl<Request: ?Sized, Response, Error> Clone for BoxCloneAsyncService<Request, Response, Error> {
    #[inline]
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl<Request, Response, Error> AsyncService<Request> for BoxCloneAsyncService<Request, Response, Error> {
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&mut self, request: Request) -> BoxFuture<Result<Self::Response, Self::Error>> {
        self.0.call(request)
    }
}

#[inline]
#[must_use]
pub(crate) const fn async_service_fn<T>(f: T) -> AsyncServiceFn<T> {
    AsyncServiceFn { f }
}

#[derive(Clone)]
pub(crate) struct AsyncServiceFn<T> {
    f: T,
}

impl<F, Request, Response, Error> AsyncService<Request> for AsyncServiceFn<F>
where
    F: FnMut(Request) -> BoxFuture<Result<Response, Error>>,
{
    type Response = Response;
    type Error = Error;

    #[inline]
    fn call(&mut self, request: Request) -> BoxFuture<Result<Self::Response, Self::Error>> {
        (self.f)(request)
    }
}
